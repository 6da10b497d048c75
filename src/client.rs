use crate::endpoint::Endpoint;
use crate::error::{ProbeError, Result};
use crate::mask;
use crate::parse::{is_timeout, ReadExt};
use crate::Message;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, trace};
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::{Digest, Sha1};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

const ACCEPT_GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Largest message we accept. Matches the payload limit of the room router.
pub const MAX_PAYLOAD: u64 = 8 * 1024 * 1024;

const NORMAL_CLOSURE: u16 = 1000;

struct Frame {
    fin: bool,
    opcode: u8,
    data: Vec<u8>,
}

enum Stream {
    Tcp(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<rustls::StreamOwned<rustls::ClientSession, TcpStream>>),
}

impl Stream {
    fn socket(&self) -> &TcpStream {
        match self {
            Stream::Tcp(s) => s,
            #[cfg(feature = "tls")]
            Stream::Tls(s) => &s.sock,
        }
    }
}

impl Read for Stream {
    fn read(&mut self, bytes: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.read(bytes),
            #[cfg(feature = "tls")]
            Stream::Tls(s) => s.read(bytes),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.write(bytes),
            #[cfg(feature = "tls")]
            Stream::Tls(s) => s.write(bytes),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => s.flush(),
            #[cfg(feature = "tls")]
            Stream::Tls(s) => s.flush(),
        }
    }
}

/// A blocking websocket connection. Closed exactly once, either by
/// [`Client::close`] or when dropped.
pub struct Client {
    stream: Stream,
    rng: OsRng,
    // Bytes that arrived together with the upgrade response.
    pending: io::Cursor<Vec<u8>>,
    reader: MessageReader,
    closed: bool,
}

/// The read half of a [`Client`]: leftover upgrade bytes, then the socket.
struct Incoming<'a> {
    pending: &'a mut io::Cursor<Vec<u8>>,
    stream: &'a mut Stream,
}

impl Read for Incoming<'_> {
    fn read(&mut self, bytes: &mut [u8]) -> io::Result<usize> {
        if (self.pending.position() as usize) < self.pending.get_ref().len() {
            return self.pending.read(bytes);
        }
        self.stream.read(bytes)
    }
}

impl Client {
    /// Open a TCP connection to `endpoint` and perform the websocket upgrade.
    ///
    /// `connect_timeout` bounds the TCP connect and the upgrade exchange.
    /// `recv_timeout` is then installed as the socket read timeout, so
    /// [`Client::recv_message`] never blocks longer than that.
    pub fn connect(
        endpoint: &Endpoint,
        connect_timeout: Duration,
        recv_timeout: Duration,
    ) -> Result<Self> {
        let socket = Self::open_socket(endpoint, connect_timeout)
            .map_err(|e| ProbeError::connect(endpoint, e))?;
        socket
            .set_read_timeout(Some(connect_timeout))
            .map_err(|e| ProbeError::connect(endpoint, e))?;
        socket
            .set_nodelay(true)
            .map_err(|e| ProbeError::connect(endpoint, e))?;

        let mut stream = Self::wrap(endpoint, socket)?;
        let mut rng = OsRng;
        let leftover = Self::init_connection(&mut stream, endpoint, &mut rng)
            .map_err(|reason| ProbeError::connect(endpoint, reason))?;

        stream
            .socket()
            .set_read_timeout(Some(recv_timeout))
            .map_err(|e| ProbeError::connect(endpoint, e))?;

        debug!("upgraded connection to {}", endpoint);

        Ok(Client {
            stream,
            rng,
            pending: io::Cursor::new(leftover),
            reader: MessageReader::client(),
            closed: false,
        })
    }

    fn open_socket(endpoint: &Endpoint, timeout: Duration) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in (endpoint.host(), endpoint.port()).to_socket_addrs()? {
            trace!("connecting to {}", addr);
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(socket) => return Ok(socket),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
        }))
    }

    #[cfg(feature = "tls")]
    fn wrap(endpoint: &Endpoint, socket: TcpStream) -> Result<Stream> {
        if !endpoint.is_secure() {
            return Ok(Stream::Tcp(socket));
        }

        let mut config = rustls::ClientConfig::new();
        config
            .root_store
            .add_server_trust_anchors(&webpki_roots::TLS_SERVER_ROOTS);
        let config = std::sync::Arc::new(config);

        let dns_name = webpki::DNSNameRef::try_from_ascii_str(endpoint.host())
            .map_err(|_| ProbeError::connect(endpoint, "host is not a valid DNS name"))?;
        let session = rustls::ClientSession::new(&config, dns_name);

        Ok(Stream::Tls(Box::new(rustls::StreamOwned::new(
            session, socket,
        ))))
    }

    #[cfg(not(feature = "tls"))]
    fn wrap(endpoint: &Endpoint, socket: TcpStream) -> Result<Stream> {
        if endpoint.is_secure() {
            return Err(ProbeError::Config(
                "wss endpoints need the `tls` feature".to_string(),
            ));
        }
        Ok(Stream::Tcp(socket))
    }

    /// Send the upgrade request and validate the response. Returns whatever
    /// followed the response header.
    fn init_connection<S>(
        stream: &mut S,
        endpoint: &Endpoint,
        rng: &mut OsRng,
    ) -> std::result::Result<Vec<u8>, String>
    where
        S: Write + Read,
    {
        let mut nonce = [0; 16];
        rng.fill_bytes(&mut nonce);
        let key = BASE64.encode(nonce);

        write!(
            stream,
            "GET {} HTTP/1.1\r\n\
             Host: {}\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Key: {}\r\n\
             Sec-WebSocket-Version: 13\r\n\r\n",
            endpoint.path_and_query(),
            endpoint.host_header(),
            key,
        )
        .map_err(|e| e.to_string())?;
        stream.flush().map_err(|e| e.to_string())?;

        let expected = accept_key(&key);
        let mut buf = Vec::with_capacity(1024);
        let mut chunk = [0; 1024];
        loop {
            let len = stream.read(&mut chunk).map_err(|e| e.to_string())?;
            if len == 0 {
                return Err("connection closed during upgrade".to_string());
            }
            buf.extend_from_slice(&chunk[..len]);

            if let Some(header_len) = parse_upgrade_response(&buf, &expected)? {
                return Ok(buf.split_off(header_len));
            }
            if buf.len() > 16 * 1024 {
                return Err("upgrade response header too large".to_string());
            }
        }
    }

    // only fin frames
    pub fn send_message(&mut self, message: &Message) -> Result<()> {
        let mut mask = [0; 4];
        self.rng.fill_bytes(&mut mask);
        let frame = encode_frame(message, Some(mask));
        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Block for at most the receive timeout waiting for one message.
    pub fn recv_message(&mut self) -> Result<Message> {
        let mut incoming = Incoming {
            pending: &mut self.pending,
            stream: &mut self.stream,
        };
        self.reader.read(&mut incoming)
    }

    /// Send a normal-closure frame and shut the socket down.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let sent = self.send_message(&Message::Close(Some((NORMAL_CLOSURE, String::new()))));
        #[cfg(feature = "tls")]
        {
            if let Stream::Tls(s) = &mut self.stream {
                use rustls::Session;
                s.sess.send_close_notify();
                let _ = s.flush();
            }
        }
        let shut = self.stream.socket().shutdown(Shutdown::Both);
        debug!("connection closed");

        sent?;
        match shut {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            debug!("error while closing connection: {}", e);
        }
    }
}

/// `Sec-WebSocket-Accept` value a server must answer for `key`.
pub fn accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(ACCEPT_GUID);
    BASE64.encode(hasher.finalize())
}

fn parse_upgrade_response(
    buf: &[u8],
    expected_accept: &str,
) -> std::result::Result<Option<usize>, String> {
    let mut headers = [httparse::EMPTY_HEADER; 64];
    let mut response = httparse::Response::new(&mut headers);
    let header_len = match response.parse(buf).map_err(|e| e.to_string())? {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Ok(None),
    };

    if response.code != Some(101) {
        return Err(format!(
            "server answered {} {}",
            response.code.unwrap_or(0),
            response.reason.unwrap_or("")
        ));
    }

    let header = |name: &str| {
        response
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value)
    };

    if !header("upgrade").map_or(false, |v| v.eq_ignore_ascii_case(b"websocket")) {
        return Err("missing `Upgrade: websocket`".to_string());
    }
    let connection_upgrade = header("connection").map_or(false, |v| {
        v.split(|&b| b == b',')
            .any(|token| {
                String::from_utf8_lossy(token)
                    .trim()
                    .eq_ignore_ascii_case("upgrade")
            })
    });
    if !connection_upgrade {
        return Err("missing `Connection: Upgrade`".to_string());
    }

    // Find the Sec-Websocket-Accept header and validate
    if header("sec-websocket-accept") != Some(expected_accept.as_bytes()) {
        return Err("missing or wrong Sec-WebSocket-Accept".to_string());
    }

    Ok(Some(header_len))
}

/// Serialize `message` as a single FIN frame. Clients must pass a mask,
/// servers must not.
pub fn encode_frame(message: &Message, mask: Option<[u8; 4]>) -> Vec<u8> {
    let (opcode, mut data) = match message {
        Message::Text(b) => (1, b.as_bytes().to_vec()),
        Message::Binary(b) => (2, b.to_vec()),
        Message::Close(None) => (8, Vec::new()),
        Message::Close(Some((code, reason))) => {
            let mut v = Vec::with_capacity(2 + reason.len());
            v.extend_from_slice(&code.to_be_bytes());
            v.extend_from_slice(reason.as_bytes());
            (8, v)
        }
        Message::Ping(b) => (9, b.to_vec()),
        Message::Pong(b) => (10, b.to_vec()),
    };
    let len = data.len();
    let mask_bit = if mask.is_some() { 0x80 } else { 0 };

    let mut frame = Vec::with_capacity(len + 14);
    // fin always 1, rsv always 0
    frame.push(0x80 | opcode);

    if len > u16::MAX as usize {
        frame.push(mask_bit | 127);
        frame.extend_from_slice(&(len as u64).to_be_bytes());
    } else if len > 125 {
        frame.push(mask_bit | 126);
        frame.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        frame.push(mask_bit | len as u8);
    }

    if let Some(key) = mask {
        frame.extend_from_slice(&key);
        for (i, byte) in data.iter_mut().enumerate() {
            *byte ^= key[i % 4];
        }
    }
    frame.extend_from_slice(&data);
    frame
}

/// Write one message to any stream. Used by peers that do not hold a [`Client`].
pub fn write_message<W: Write>(
    writer: &mut W,
    message: &Message,
    mask: Option<[u8; 4]>,
) -> io::Result<()> {
    writer.write_all(&encode_frame(message, mask))?;
    writer.flush()
}

/// Reads complete messages off a websocket stream.
///
/// Control frames may arrive between the fragments of a data message. They
/// are handed out first, in arrival order, and the joined data message follows.
#[derive(Debug)]
pub struct MessageReader {
    // Peers read frames from clients, which must be masked.
    expect_masked: bool,
    backlog: VecDeque<Message>,
}

impl MessageReader {
    /// Reader for the client side. Frames from a server must not be masked.
    pub fn client() -> Self {
        MessageReader {
            expect_masked: false,
            backlog: VecDeque::new(),
        }
    }

    /// Reader for the server side. Frames from a client must be masked.
    pub fn server() -> Self {
        MessageReader {
            expect_masked: true,
            backlog: VecDeque::new(),
        }
    }

    /// Read one complete message, joining continuation frames.
    ///
    /// A read timeout before the first byte is [`ProbeError::ReceiveTimeout`].
    /// Once a frame has started, stalling is a protocol error.
    pub fn read<R: Read>(&mut self, reader: &mut R) -> Result<Message> {
        if let Some(message) = self.backlog.pop_front() {
            return Ok(message);
        }

        let first = self.read_frame(reader)?;
        if first.opcode == 0 {
            return Err(ProbeError::Protocol(
                "continuation frame without a message to continue".to_string(),
            ));
        }
        if first.fin || is_control(first.opcode) {
            return decode(first.opcode, first.data);
        }

        let opcode = first.opcode;
        let mut data = first.data;
        loop {
            let frame = match self.read_frame(reader) {
                Err(ProbeError::ReceiveTimeout) => {
                    return Err(ProbeError::Protocol(
                        "fragmented message stalled".to_string(),
                    ))
                }
                other => other?,
            };
            if is_control(frame.opcode) {
                self.backlog.push_back(decode(frame.opcode, frame.data)?);
                continue;
            }
            if frame.opcode != 0 {
                return Err(ProbeError::Protocol(
                    "continuation frames must have opcode 0".to_string(),
                ));
            }
            if (data.len() + frame.data.len()) as u64 > MAX_PAYLOAD {
                return Err(ProbeError::Protocol(format!(
                    "message exceeds {} bytes",
                    MAX_PAYLOAD
                )));
            }
            data.extend_from_slice(&frame.data);
            if frame.fin {
                break;
            }
        }

        let message = decode(opcode, data)?;
        match self.backlog.pop_front() {
            Some(control) => {
                self.backlog.push_back(message);
                Ok(control)
            }
            None => Ok(message),
        }
    }

    fn read_frame<R: Read>(&self, reader: &mut R) -> Result<Frame> {
        let first = match reader.read_u8() {
            Ok(b) => b,
            Err(e) if is_timeout(&e) => return Err(ProbeError::ReceiveTimeout),
            Err(e) => return Err(e.into()),
        };
        let (fin, _rsv, opcode) = mask!(first, 0b1000_0000, 0b0111_0000, 0b0000_1111);
        let fin = fin > 0;

        let (masked, payload_length) =
            mask!(reader.read_u8().map_err(stalled)?, 0b1000_0000, 0b0111_1111);
        let masked = masked > 0;
        let mut payload_length = payload_length as u64;

        if masked != self.expect_masked {
            return Err(ProbeError::Protocol(if masked {
                "server frames must not be masked".to_string()
            } else {
                "client frames must be masked".to_string()
            }));
        }

        if payload_length == 126 {
            payload_length = reader.read_u16_be().map_err(stalled)? as u64;
        } else if payload_length == 127 {
            payload_length = reader.read_u64_be().map_err(stalled)?;
        }
        if is_control(opcode) && (!fin || payload_length > 125) {
            return Err(ProbeError::Protocol(
                "control frames must be final and at most 125 bytes".to_string(),
            ));
        }
        if payload_length > MAX_PAYLOAD {
            return Err(ProbeError::Protocol(format!(
                "frame of {} bytes exceeds {} bytes",
                payload_length, MAX_PAYLOAD
            )));
        }

        let masking_key = if masked {
            let mut key = [0; 4];
            reader.read_exact(&mut key).map_err(stalled)?;
            Some(key)
        } else {
            None
        };

        let mut data = vec![0; payload_length as usize];
        if payload_length > 0 {
            reader.read_exact(&mut data).map_err(stalled)?;
        }

        if let Some(key) = masking_key {
            for (i, byte) in data.iter_mut().enumerate() {
                *byte ^= key[i % 4];
            }
        }

        Ok(Frame { fin, opcode, data })
    }
}

fn is_control(opcode: u8) -> bool {
    opcode & 0b1000 != 0
}

fn decode(opcode: u8, data: Vec<u8>) -> Result<Message> {
    Ok(match opcode {
        1 => Message::Text(
            String::from_utf8(data)
                .map_err(|_| ProbeError::Protocol("text frame is not UTF-8".to_string()))?,
        ),
        2 => Message::Binary(data),
        8 => match data.len() {
            0 => Message::Close(None),
            1 => {
                return Err(ProbeError::Protocol(
                    "close payload of one byte".to_string(),
                ))
            }
            _ => {
                let code = u16::from_be_bytes([data[0], data[1]]);
                let reason = String::from_utf8(data[2..].to_vec()).map_err(|_| {
                    ProbeError::Protocol("close reason is not UTF-8".to_string())
                })?;
                Message::Close(Some((code, reason)))
            }
        },
        9 => Message::Ping(data),
        10 => Message::Pong(data),
        other => {
            return Err(ProbeError::Protocol(format!(
                "unrecognized opcode {}",
                other
            )))
        }
    })
}

fn stalled(e: io::Error) -> ProbeError {
    if is_timeout(&e) {
        ProbeError::Protocol("read timed out in the middle of a frame".to_string())
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_from_server(bytes: Vec<u8>) -> Result<Message> {
        MessageReader::client().read(&mut Cursor::new(bytes))
    }

    #[test]
    fn accept_key_matches_rfc_sample() {
        assert_eq!(
            accept_key("dGhlIHNhbXBsZSBub25jZQ=="),
            "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        );
    }

    #[test]
    fn masked_ping_has_empty_payload() {
        let frame = encode_frame(&Message::Ping(Vec::new()), Some([1, 2, 3, 4]));
        assert_eq!(frame, vec![0x89, 0x80, 1, 2, 3, 4]);
    }

    #[test]
    fn masked_binary_is_readable_by_a_server() {
        let payload = crate::packets::ROOM_WAVE_PACKET.to_vec();
        let frame = encode_frame(&Message::Binary(payload.clone()), Some([0xDE, 0xAD, 0xBE, 0xEF]));
        assert_eq!(frame[0], 0x82);
        assert_eq!(frame[1], 0x80 | 22);
        assert_ne!(&frame[6..], &payload[..]);
        match MessageReader::server().read(&mut Cursor::new(frame)).unwrap() {
            Message::Binary(data) => assert_eq!(data, payload),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn mask_direction_is_enforced() {
        let masked = encode_frame(&Message::Binary(vec![1]), Some([1, 2, 3, 4]));
        assert!(matches!(
            read_from_server(masked),
            Err(ProbeError::Protocol(_))
        ));

        let unmasked = encode_frame(&Message::Binary(vec![1]), None);
        assert!(matches!(
            MessageReader::server().read(&mut Cursor::new(unmasked)),
            Err(ProbeError::Protocol(_))
        ));
    }

    #[test]
    fn medium_and_large_lengths() {
        let frame = encode_frame(&Message::Binary(vec![7; 300]), None);
        assert_eq!(&frame[..4], &[0x82, 126, 0x01, 0x2C]);
        assert_eq!(frame.len(), 4 + 300);

        let frame = encode_frame(&Message::Binary(vec![7; 70_000]), None);
        assert_eq!(frame[1], 127);
        assert_eq!(&frame[2..10], &70_000u64.to_be_bytes());
    }

    #[test]
    fn joins_continuation_frames() {
        // "Hel" + "lo" as a fragmented text message
        let bytes = vec![0x01, 3, b'H', b'e', b'l', 0x80, 2, b'l', b'o'];
        match read_from_server(bytes).unwrap() {
            Message::Text(s) => assert_eq!(s, "Hello"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn control_frame_between_fragments() {
        // text(fin=0) "He", ping, continuation(fin=1) "llo"
        let bytes = vec![
            0x01, 2, b'H', b'e', 0x89, 0, 0x80, 3, b'l', b'l', b'o',
        ];
        let mut cursor = Cursor::new(bytes);
        let mut reader = MessageReader::client();
        assert_eq!(reader.read(&mut cursor).unwrap(), Message::Ping(Vec::new()));
        assert_eq!(
            reader.read(&mut cursor).unwrap(),
            Message::Text("Hello".to_string())
        );
        assert!(matches!(
            reader.read(&mut cursor),
            Err(ProbeError::Transport(_))
        ));
    }

    #[test]
    fn close_with_code() {
        let frame = encode_frame(&Message::Close(Some((1001, "bye".to_string()))), None);
        match read_from_server(frame).unwrap() {
            Message::Close(Some((code, reason))) => {
                assert_eq!(code, 1001);
                assert_eq!(reason, "bye");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_frames() {
        let mut long_ping = vec![0x89, 126, 0, 126];
        long_ping.extend_from_slice(&[0; 126]);
        let cases: Vec<Vec<u8>> = vec![
            vec![0x83, 0],                           // reserved opcode
            vec![0x81, 2, 0xC3, 0x28],               // invalid UTF-8
            vec![0x88, 1, 0x03],                     // truncated close code
            vec![0x01, 1, b'a', 0x82, 1, b'b'],      // non-continuation inside fragment
            vec![0x80, 1, b'a'],                     // continuation with nothing to continue
            vec![0x09, 0],                           // fragmented ping
            long_ping,                               // ping over 125 bytes
            vec![0x82, 127, 0, 0, 0, 0, 1, 0, 0, 0], // 16 MiB
        ];
        for bytes in cases {
            match read_from_server(bytes.clone()) {
                Err(ProbeError::Protocol(_)) => {}
                other => panic!("{:?} read as {:?}", bytes, other),
            }
        }
    }

    #[test]
    fn eof_is_a_transport_error() {
        match read_from_server(Vec::new()) {
            Err(ProbeError::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
    }

    struct TimesOut;

    impl Read for TimesOut {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::WouldBlock))
        }
    }

    #[test]
    fn idle_read_is_a_receive_timeout() {
        assert!(matches!(
            MessageReader::client().read(&mut TimesOut),
            Err(ProbeError::ReceiveTimeout)
        ));
    }

    #[test]
    fn stall_mid_frame_is_fatal() {
        let mut reader = Cursor::new(vec![0x82, 5, 1]).chain(TimesOut);
        let err = MessageReader::client().read(&mut reader).unwrap_err();
        assert!(matches!(err, ProbeError::Protocol(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn upgrade_response_validation() {
        let accept = accept_key("dGhlIHNhbXBsZSBub25jZQ==");
        let header = format!(
            "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\
             Connection: keep-alive, Upgrade\r\nSec-WebSocket-Accept: {}\r\n\r\n",
            accept
        );
        let mut ok = header.clone().into_bytes();
        ok.extend_from_slice(&[0x89, 0x00]);
        assert_eq!(
            parse_upgrade_response(&ok, &accept).unwrap(),
            Some(header.len())
        );
        assert_eq!(parse_upgrade_response(&ok[..20], &accept).unwrap(), None);

        let forbidden = "HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n";
        let err = parse_upgrade_response(forbidden.as_bytes(), &accept).unwrap_err();
        assert!(err.contains("403"));

        let wrong = "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\
                     Connection: Upgrade\r\nSec-WebSocket-Accept: nope\r\n\r\n";
        assert!(parse_upgrade_response(wrong.as_bytes(), &accept).is_err());

        let no_upgrade = format!(
            "HTTP/1.1 101 Switching Protocols\r\nConnection: Upgrade\r\n\
             Sec-WebSocket-Accept: {}\r\n\r\n",
            accept
        );
        let err = parse_upgrade_response(no_upgrade.as_bytes(), &accept).unwrap_err();
        assert!(err.contains("Upgrade: websocket"));

        let no_connection = format!(
            "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\
             Connection: keep-alive\r\nSec-WebSocket-Accept: {}\r\n\r\n",
            accept
        );
        let err = parse_upgrade_response(no_connection.as_bytes(), &accept).unwrap_err();
        assert!(err.contains("Connection: Upgrade"));
    }
}
