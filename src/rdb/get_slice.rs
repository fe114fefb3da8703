pub fn get_buffer_slice(buffer: &[u8], cursor: usize, len: usize) -> std::io::Result<&[u8]> {
    let end = cursor.checked_add(len).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "Length overflows buffer")
    })?;

    if end > buffer.len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "Not enough data in buffer",
        ));
    }

    Ok(&buffer[cursor..end])
}

/// Copies `N` bytes at `cursor` into a fixed-size array.
pub fn get_buffer_array<const N: usize>(buffer: &[u8], cursor: usize) -> std::io::Result<[u8; N]> {
    let slice = get_buffer_slice(buffer, cursor, N)?;

    slice.try_into().map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("Not enough bytes for {}-byte value", N),
        )
    })
}
