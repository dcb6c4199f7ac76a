//! Integration tests for packetwire.
//!
//! Scripted streams cover exact chunk boundaries; loopback sockets cover the
//! real transport path, deadlines included.

use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use packetwire::transport::ScriptedTransport;
use packetwire::{BufferConfig, BufferError, FillMode, PacketBuffer, DEFAULT_BUF_SIZE};

/// Connected loopback pair: (client, server).
fn tcp_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

/// Build a frame with a 4-byte little-endian length prefix.
fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = (payload.len() as u32).to_le_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

/// Read one length-prefixed frame, returning its payload.
fn read_frame<T: packetwire::Transport>(
    buffer: &mut PacketBuffer<T>,
) -> Result<Vec<u8>, BufferError> {
    let header = buffer.read_next(4, FillMode::Large)?;
    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    Ok(buffer.read_next(len, FillMode::Large)?.to_vec())
}

/// Chunked stream, consumed across chunk boundaries, then truncated.
#[test]
fn test_chunked_stream_scenario() {
    let mut buffer = PacketBuffer::new(ScriptedTransport::new().chunk(b"AB").chunk(b"CDE"));

    assert_eq!(buffer.read_next(1, FillMode::Large).unwrap(), b"A");
    assert_eq!(buffer.read_next(3, FillMode::Large).unwrap(), b"BCD");
    assert_eq!(buffer.read_next(1, FillMode::Large).unwrap(), b"E");
    assert!(matches!(
        buffer.read_next(1, FillMode::Large),
        Err(BufferError::UnexpectedEof)
    ));
}

/// Small checkout shares storage; a larger one grows it for good.
#[test]
fn test_checkout_growth_scenario() {
    let mut buffer = PacketBuffer::new(ScriptedTransport::new());
    assert_eq!(buffer.capacity(), DEFAULT_BUF_SIZE);

    let small = buffer.take_buffer(10).unwrap().as_ptr();
    assert_eq!(buffer.capacity(), DEFAULT_BUF_SIZE);
    assert_eq!(buffer.take_complete_buffer().unwrap().as_ptr(), small);

    buffer.take_buffer(8192).unwrap();
    assert!(buffer.capacity() >= 8192);
    let grown = buffer.take_buffer(10).unwrap().as_ptr();
    assert_eq!(buffer.take_buffer(8192).unwrap().as_ptr(), grown);
}

/// A stream that ends exactly on the requested boundary is not truncated.
#[test]
fn test_exact_end_of_stream() {
    let mut buffer = PacketBuffer::new(ScriptedTransport::new().chunk(&frame(b"done")));

    assert_eq!(read_frame(&mut buffer).unwrap(), b"done");
    assert!(buffer.is_idle());
}

/// A truncated frame keeps what arrived and blocks checkouts until cleared.
#[test]
fn test_truncated_frame_leaves_buffer_busy() {
    let bytes = frame(b"incomplete payload");
    let mut buffer = PacketBuffer::new(ScriptedTransport::new().chunk(&bytes[..10]));

    assert!(matches!(
        read_frame(&mut buffer),
        Err(BufferError::UnexpectedEof)
    ));
    assert_eq!(buffer.buffered(), 6);
    assert!(matches!(buffer.take_buffer(4), Err(BufferError::BusyBuffer)));

    buffer.clear();
    assert!(buffer.take_buffer(4).is_ok());
}

/// Frames written in pieces with pauses arrive intact over TCP.
#[test]
fn test_tcp_fragmented_frames() {
    let (client, mut server) = tcp_pair();

    let peer = thread::spawn(move || {
        let bytes = [frame(b"first frame"), frame(&vec![0x5a; 9000])].concat();
        for piece in bytes.chunks(1500) {
            server.write_all(piece).unwrap();
            thread::sleep(Duration::from_millis(2));
        }
    });

    let mut buffer = PacketBuffer::new(client);
    assert_eq!(read_frame(&mut buffer).unwrap(), b"first frame");

    let big = read_frame(&mut buffer).unwrap();
    assert_eq!(big.len(), 9000);
    assert!(big.iter().all(|&b| b == 0x5a));
    assert_eq!(buffer.capacity(), 12_288);

    peer.join().unwrap();
    assert!(matches!(
        buffer.read_next(1, FillMode::Large),
        Err(BufferError::UnexpectedEof)
    ));
}

/// A silent peer trips the per-read deadline.
#[test]
fn test_tcp_read_deadline_expires() {
    let (client, _server) = tcp_pair();
    let config = BufferConfig::new().with_read_timeout(Duration::from_millis(50));
    let mut buffer = PacketBuffer::with_config(client, config);

    let err = buffer.read_next(1, FillMode::Large).unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");
    assert!(buffer.is_idle());
}

/// Request/response cycles on one connection, both sides using a buffer for
/// reading and their checkouts for writing.
#[test]
fn test_tcp_request_response_cycles() {
    let (client, server) = tcp_pair();
    let sizes = [10usize, 6000, 100];

    let peer = thread::spawn(move || {
        let mut writer = server.try_clone().unwrap();
        let mut buffer = PacketBuffer::new(server);

        for _ in 0..sizes.len() {
            let payload = read_frame(&mut buffer).unwrap();
            let out = buffer.take_buffer(payload.len() + 4).unwrap();
            out.copy_from_slice(&frame(&payload));
            writer.write_all(out).unwrap();
        }
    });

    let mut writer = client.try_clone().unwrap();
    let mut buffer = PacketBuffer::new(client);

    for (round, &size) in sizes.iter().enumerate() {
        let out = buffer.take_buffer(size + 4).unwrap();
        out[..4].copy_from_slice(&(size as u32).to_le_bytes());
        out[4..].fill(round as u8);
        writer.write_all(out).unwrap();

        let echoed = read_frame(&mut buffer).unwrap();
        assert_eq!(echoed.len(), size);
        assert!(echoed.iter().all(|&b| b == round as u8));
    }

    // The 6004-byte request grew the buffer exactly; nothing grew it since.
    assert_eq!(buffer.capacity(), 6004);
    peer.join().unwrap();
}

/// A shared `&TcpStream` reads through the buffer and writes directly.
#[test]
fn test_tcp_shared_reference_transport() {
    let (client, mut server) = tcp_pair();
    server.write_all(&frame(b"ping")).unwrap();

    let mut buffer = PacketBuffer::new(&client);
    assert_eq!(read_frame(&mut buffer).unwrap(), b"ping");

    let out = buffer.take_small_buffer(8).unwrap();
    out.copy_from_slice(&frame(b"pong"));
    (&client).write_all(out).unwrap();

    let mut reply = PacketBuffer::new(server);
    assert_eq!(read_frame(&mut reply).unwrap(), b"pong");
}

/// Skipping a large payload discards it without growing the buffer.
#[test]
fn test_tcp_skip_large_payload() {
    let (client, mut server) = tcp_pair();

    let peer = thread::spawn(move || {
        server.write_all(&vec![0xee; 100_000]).unwrap();
        server.write_all(b"end").unwrap();
    });

    let mut buffer = PacketBuffer::new(client);
    buffer.skip(100_000).unwrap();
    assert_eq!(buffer.read_next(3, FillMode::Large).unwrap(), b"end");
    assert_eq!(buffer.capacity(), DEFAULT_BUF_SIZE);

    peer.join().unwrap();
}

/// Retained views outlive a growing refill on a real socket.
#[test]
fn test_tcp_retained_view() {
    let (client, mut server) = tcp_pair();

    let peer = thread::spawn(move || {
        server.write_all(b"token:").unwrap();
        thread::sleep(Duration::from_millis(5));
        server.write_all(&vec![1u8; 20_000]).unwrap();
    });

    let mut buffer = PacketBuffer::new(client);
    let (token, mut rest) = buffer.read_retained(6).unwrap();
    let body = rest.read_next(20_000).unwrap();
    assert_eq!(body.len(), 20_000);
    assert_eq!(token, b"token:");

    peer.join().unwrap();
}

/// Store hands a grown outgoing buffer back for reuse.
#[test]
fn test_store_after_encoding() {
    let mut buffer = PacketBuffer::new(ScriptedTransport::new());

    let mut encoded = buffer.take_complete_buffer().unwrap()[..16].to_vec();
    encoded.resize(20_000, 0);
    let ptr = encoded.as_ptr();

    buffer.store(encoded).unwrap();
    assert!(buffer.capacity() >= 20_000);
    assert_eq!(buffer.take_buffer(20_000).unwrap().as_ptr(), ptr);
}

#[cfg(unix)]
#[test]
fn test_unix_stream_transport() {
    use std::os::unix::net::UnixStream;

    let (a, mut b) = UnixStream::pair().unwrap();
    b.write_all(&frame(b"over unix")).unwrap();
    drop(b);

    let mut buffer = PacketBuffer::new(a);
    assert_eq!(read_frame(&mut buffer).unwrap(), b"over unix");
    assert!(matches!(
        buffer.peek_byte(FillMode::Safe),
        Err(BufferError::UnexpectedEof)
    ));
}

/// Errors from the transport keep their kind.
#[test]
fn test_transport_errors_unchanged() {
    let transport = ScriptedTransport::new().error(io::ErrorKind::ConnectionAborted);
    let mut buffer = PacketBuffer::new(transport);

    match buffer.skip(10) {
        Err(BufferError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionAborted),
        other => panic!("unexpected result: {other:?}"),
    }
}
