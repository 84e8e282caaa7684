//! Connection liveness probing
//!
//! Surfaces a reset or failed connection even while the session's reader
//! is busy elsewhere and its writer has nothing to send. An orderly
//! half-close is left to the reader, which sees EOF only after it has
//! forwarded every complete line the peer sent.

use std::io;
use std::net::TcpStream;

/// Checks whether the peer is still connected
pub trait LivenessProbe: Send {
    /// `Ok(())` while the connection looks alive
    fn check(&mut self) -> io::Result<()>;
}

/// Probe over a duplicated handle of the session's TCP socket
///
/// Peeks without consuming, so the reader's framing is untouched. A peek
/// of 0 bytes (orderly FIN) still counts as alive.
#[derive(Debug)]
pub struct TcpProbe {
    socket: TcpStream,
}

impl TcpProbe {
    pub fn new(socket: TcpStream) -> io::Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(Self { socket })
    }
}

impl LivenessProbe for TcpProbe {
    fn check(&mut self) -> io::Result<()> {
        if let Some(err) = self.socket.take_error()? {
            return Err(err);
        }

        let mut buf = [0u8; 1];
        match self.socket.peek(&mut buf) {
            Ok(_) => Ok(()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{Shutdown, TcpListener};

    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (server, client)
    }

    #[test]
    fn test_idle_connection_is_alive() {
        let (server, _client) = pair();
        let mut probe = TcpProbe::new(server).unwrap();
        assert!(probe.check().is_ok());
    }

    #[test]
    fn test_pending_data_is_alive_and_not_consumed() {
        let (server, mut client) = pair();
        client.write_all(b"hi\n").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));

        let mut probe = TcpProbe::new(server.try_clone().unwrap()).unwrap();
        assert!(probe.check().is_ok());

        let mut buf = [0u8; 3];
        server.peek(&mut buf).unwrap();
        assert_eq!(&buf, b"hi\n");
    }

    #[test]
    fn test_half_closed_peer_left_to_reader() {
        let (server, mut client) = pair();
        client.write_all(b"last words\n").unwrap();
        client.shutdown(Shutdown::Write).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));

        // Buffered lines must still be read, so FIN alone is not fatal
        let mut probe = TcpProbe::new(server.try_clone().unwrap()).unwrap();
        assert!(probe.check().is_ok());

        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut &server, &mut buf).ok();
        assert!(probe.check().is_ok());
    }
}
