use bytes::Bytes;

use crate::rdb::get_slice::{get_buffer_array, get_buffer_slice};

#[derive(Debug, PartialEq)]
enum ValueEncoding {
    Length(usize),
    Int8,
    Int16,
    Int32,
    LzfCompressedString,
}

fn invalid_data(message: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, message.to_string())
}

fn parse_length_encoding(bytes: &[u8], cursor: usize) -> std::io::Result<(ValueEncoding, usize)> {
    let mut temp_cursor = cursor;
    let byte = get_buffer_slice(bytes, temp_cursor, 1)?[0];
    temp_cursor += 1;

    // The two most significant bits select the encoding
    let value_encoding = match byte >> 6 {
        0b00 => ValueEncoding::Length((byte & 0b0011_1111) as usize),
        0b01 => {
            // 14-bit length: low 6 bits of this byte are the high bits
            let lower_8_bits = get_buffer_slice(bytes, temp_cursor, 1)?[0] as u16;
            temp_cursor += 1;

            let high_6_bits = (byte & 0b0011_1111) as u16;

            ValueEncoding::Length(((high_6_bits << 8) | lower_8_bits) as usize)
        }
        0b10 => match byte {
            0x80 => {
                let length = u32::from_be_bytes(get_buffer_array::<4>(bytes, temp_cursor)?);
                temp_cursor += 4;

                ValueEncoding::Length(length as usize)
            }
            0x81 => {
                let length = u64::from_be_bytes(get_buffer_array::<8>(bytes, temp_cursor)?);
                temp_cursor += 8;

                let length = usize::try_from(length)
                    .map_err(|_| invalid_data("Length does not fit in memory"))?;
                ValueEncoding::Length(length)
            }
            _ => return Err(invalid_data("Invalid length encoding")),
        },
        _ => match byte & 0b0011_1111 {
            0 => ValueEncoding::Int8,
            1 => ValueEncoding::Int16,
            2 => ValueEncoding::Int32,
            3 => ValueEncoding::LzfCompressedString,
            _ => return Err(invalid_data("Invalid length encoding")),
        },
    };

    Ok((value_encoding, temp_cursor - cursor))
}

/// Plain length prefix, as used for sizes and database numbers.
pub fn parse_length(bytes: &[u8], cursor: usize) -> std::io::Result<(usize, usize)> {
    match parse_length_encoding(bytes, cursor)? {
        (ValueEncoding::Length(length), bytes_read) => Ok((length, bytes_read)),
        _ => Err(invalid_data("Value should be length encoded integer")),
    }
}

/// String-encoded value. Integer encodings are little-endian signed and come
/// back as their decimal text, the way the server would hand them to clients.
pub fn parse_string(bytes: &[u8], cursor: usize) -> std::io::Result<(Bytes, usize)> {
    let mut temp_cursor = cursor;
    let (value_encoding, encoding_length) = parse_length_encoding(bytes, temp_cursor)?;
    temp_cursor += encoding_length;

    let value = match value_encoding {
        ValueEncoding::Length(length) => {
            let byte_slice = get_buffer_slice(bytes, temp_cursor, length)?;
            temp_cursor += length;

            Bytes::copy_from_slice(byte_slice)
        }
        ValueEncoding::Int8 => {
            let value = i8::from_le_bytes(get_buffer_array::<1>(bytes, temp_cursor)?);
            temp_cursor += 1;

            Bytes::from(value.to_string())
        }
        ValueEncoding::Int16 => {
            let value = i16::from_le_bytes(get_buffer_array::<2>(bytes, temp_cursor)?);
            temp_cursor += 2;

            Bytes::from(value.to_string())
        }
        ValueEncoding::Int32 => {
            let value = i32::from_le_bytes(get_buffer_array::<4>(bytes, temp_cursor)?);
            temp_cursor += 4;

            Bytes::from(value.to_string())
        }
        ValueEncoding::LzfCompressedString => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "LZF compressed strings are not supported",
            ))
        }
    };

    Ok((value, temp_cursor - cursor))
}

/// String value that must be valid UTF-8, such as key names.
pub fn parse_utf8_string(bytes: &[u8], cursor: usize) -> std::io::Result<(String, usize)> {
    let (value, bytes_read) = parse_string(bytes, cursor)?;
    let value = String::from_utf8(value.to_vec()).map_err(|_| invalid_data("Invalid UTF-8"))?;

    Ok((value, bytes_read))
}
