use bincode::config;
use serde::{Serialize, de::DeserializeOwned};
use std::io::{self, Read, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::errors::SerializationError;

/// Maximum allowed message size (1MB) to prevent unbounded allocation
/// from a hostile or broken peer.
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Serialize `value` into one frame: a u32-LE size prefix followed by
/// the bincode body, in a single buffer so a frame is always written in
/// one chunk (preventing read-side EOF races).
fn encode_frame<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let body = bincode::serde::encode_to_vec(value, config::standard())?;
    if body.len() > MAX_MESSAGE_SIZE {
        return Err(SerializationError::MessageTooLarge {
            actual: body.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let mut frame = Vec::from((body.len() as u32).to_le_bytes());
    frame.extend(body);
    Ok(frame)
}

fn decode_body<T: DeserializeOwned>(buf: &[u8]) -> io::Result<T> {
    match bincode::serde::decode_from_slice(buf, config::standard()) {
        Ok((value, _)) => Ok(value),
        Err(error) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            SerializationError::from(error),
        )),
    }
}

fn check_frame_size(len: usize) -> io::Result<()> {
    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            SerializationError::MessageTooLarge {
                actual: len,
                max: MAX_MESSAGE_SIZE,
            },
        ));
    }
    Ok(())
}

pub fn read_prefixed<T: DeserializeOwned, R: Read>(reader: &mut R) -> io::Result<T> {
    let mut len_bytes = [0; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    check_frame_size(len)?;

    // If we get a would-block error while reading the body, the sender
    // very likely doesn't follow the prefix protocol. Surface it as
    // invalid data so readers can decide how to handle such senders.
    let mut buf = vec![0; len];
    if let Err(error) = reader.read_exact(&mut buf) {
        let kind = match error.kind() {
            io::ErrorKind::WouldBlock => io::ErrorKind::InvalidData,
            kind => kind,
        };
        return Err(kind.into());
    }
    decode_body(&buf)
}

pub fn write_prefixed<T: Serialize, W: Write>(writer: &mut W, value: &T) -> io::Result<()> {
    let frame =
        encode_frame(value).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    writer.write_all(&frame)
}

pub async fn read_prefixed_async<T: DeserializeOwned, R: AsyncRead + Unpin>(
    reader: &mut R,
) -> io::Result<T> {
    let mut len_bytes = [0; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    check_frame_size(len)?;

    let mut buf = vec![0; len];
    reader.read_exact(&mut buf).await?;
    decode_body(&buf)
}

pub async fn write_prefixed_async<T: Serialize, W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &T,
) -> io::Result<()> {
    let frame =
        encode_frame(value).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    writer.write_all(&frame).await
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Write};
    use std::net::{TcpListener, TcpStream};

    use super::{read_prefixed, read_prefixed_async, write_prefixed, write_prefixed_async};

    fn setup() -> (TcpStream, TcpStream) {
        let server = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (stream, _) = server.accept().unwrap();
        (client, stream)
    }

    #[test]
    fn write_and_read() {
        let (mut client, mut stream) = setup();
        let value = "Hello, World!".to_string();
        assert!(write_prefixed(&mut stream, &value).is_ok());
        assert!(read_prefixed::<String, TcpStream>(&mut client).is_ok_and(|v| v == value));
    }

    #[test]
    fn write_and_read_invalid_data() {
        let (mut client, mut stream) = setup();

        // A size prefix with a truncated body is unexpected EOF once
        // the writer hangs up.
        assert!(stream.write_all(&13u32.to_le_bytes()).is_ok());
        assert!(stream.write_all(b"Hello, Wor").is_ok());
        drop(stream);
        assert_eq!(
            read_prefixed::<String, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn reject_oversized_message() {
        let (mut client, mut stream) = setup();

        // A size prefix claiming 2GB must be rejected before any
        // allocation happens.
        let malicious_size = 2_000_000_000u32;
        assert!(stream.write_all(&malicious_size.to_le_bytes()).is_ok());
        assert_eq!(
            read_prefixed::<String, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
    }

    #[test]
    fn write_and_read_multiple_messages() {
        let (mut client, mut stream) = setup();

        let msgs = ["first", "second", "third"];
        for msg in &msgs {
            assert!(write_prefixed(&mut stream, &msg.to_string()).is_ok());
        }
        for msg in &msgs {
            let received: String = read_prefixed(&mut client).unwrap();
            assert_eq!(&received, msg);
        }
    }

    #[test]
    fn garbage_body_is_invalid_data() {
        let mut buf = Vec::new();
        buf.extend(4u32.to_le_bytes());
        buf.extend([0xff, 0xff, 0xff, 0xff]);
        let mut cursor = Cursor::new(buf);
        assert_eq!(
            read_prefixed::<Vec<String>, _>(&mut cursor).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
    }

    #[tokio::test]
    async fn async_write_and_sync_read_interoperate() {
        let mut buf = Vec::new();
        write_prefixed_async(&mut buf, &"mixed runtime".to_string())
            .await
            .unwrap();
        let received: String = read_prefixed(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(received, "mixed runtime");

        let mut buf = Vec::new();
        write_prefixed(&mut buf, &42u64).unwrap();
        let mut slice = buf.as_slice();
        let received: u64 = read_prefixed_async(&mut slice).await.unwrap();
        assert_eq!(received, 42);
    }
}
