//! UDP datagram adapters with optional IPv4 multicast.
//!
//! One datagram carries one encoded track. The receiver can join a multicast
//! group so several processes can listen to the same publisher.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use crate::ports::{DataReceiver, DataSender, RawMessage, ReceiveError, SendError};

pub const MAX_DATAGRAM_BYTES: usize = 65_536;

const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

pub struct UdpReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpReceiver {
    /// Bind `addr`, joining `group` on `interface` when given.
    pub fn bind(addr: SocketAddr, multicast: Option<(Ipv4Addr, Ipv4Addr)>) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        if let Some((group, interface)) = multicast {
            socket.join_multicast_v4(&group, &interface)?;
            log::info!("Joined multicast group {} on {}", group, interface);
        }
        log::info!("UDP receiver listening on {}", socket.local_addr()?);
        Ok(UdpReceiver {
            socket,
            buf: vec![0u8; MAX_DATAGRAM_BYTES],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl DataReceiver for UdpReceiver {
    fn receive(&mut self, timeout: Duration) -> Result<Option<RawMessage>, ReceiveError> {
        // a zero read timeout is rejected by the OS
        self.socket.set_read_timeout(Some(timeout.max(MIN_READ_TIMEOUT)))?;
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, from)) => {
                log::trace!("Received {} bytes from {}", len, from);
                Ok(Some(self.buf[..len].to_vec()))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub struct UdpSender {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSender {
    pub fn connect(bind: SocketAddr, target: SocketAddr, multicast_ttl: u32) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind)?;
        if target.ip().is_multicast() {
            socket.set_multicast_ttl_v4(multicast_ttl)?;
        }
        log::info!(
            "UDP sender bound to {}, publishing to {}",
            socket.local_addr()?,
            target
        );
        Ok(UdpSender { socket, target })
    }
}

impl DataSender for UdpSender {
    fn send(&mut self, payload: RawMessage) -> Result<(), SendError> {
        let sent = self.socket.send_to(&payload, self.target)?;
        if sent != payload.len() {
            return Err(SendError::Transport(format!(
                "short datagram: {} of {} bytes",
                sent,
                payload.len()
            )));
        }
        Ok(())
    }
}
