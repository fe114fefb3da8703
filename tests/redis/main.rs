mod connection;
mod stream;
mod test_utils;
