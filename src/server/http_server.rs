use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum request headers accepted per request.
pub const MAX_HEADERS: usize = 32;

/// Binds tried when a `:0` port is taken between probing and binding.
const EPHEMERAL_BIND_ATTEMPTS: usize = 3;

/// Wrapper around may_minihttp's HTTP server.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the server accepts TCP connections.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the server is not accepting after `timeout`.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// [`wait_ready_for`](Self::wait_ready_for) with a one second timeout.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the server is not accepting within a second.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(Duration::from_secs(1))
    }

    /// Cancel the accept loop and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: the handle is owned here and cancelling the accept coroutine
        // is the intended shutdown path; nothing runs on it afterwards.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let addr = self.addr;
        if self.handle.join().is_err() {
            // a cancelled coroutine reports its unwind as an error
            debug!(addr = %addr, "Accept loop cancelled");
        }
        info!(addr = %addr, "HTTP server stopped");
    }

    /// Block until the server coroutine exits.
    ///
    /// # Errors
    ///
    /// If the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

/// Resolve `addr`, asking the OS for a free port when it is `:0`.
///
/// The listener used to find the port is closed before the server binds, so another socket
/// can claim the port in between. [`HttpServer::start`] retries with a fresh
/// port when that happens.
///
/// # Errors
///
/// If the address does not resolve or no port can be reserved.
pub fn resolve_addr<A: ToSocketAddrs>(addr: A) -> io::Result<SocketAddr> {
    let addr = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
    if addr.port() != 0 {
        return Ok(addr);
    }
    let listener = TcpListener::bind(addr)?;
    listener.local_addr()
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Start serving on `addr`.
    ///
    /// A port of `0` picks a free port; read it back with [`ServerHandle::addr`].
    ///
    /// # Errors
    ///
    /// If the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let requested = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let mut attempt = 1;
        loop {
            let addr = resolve_addr(requested)?;
            match HttpServerWithHeaders::<_, MAX_HEADERS>(self.0.clone()).start(addr) {
                Ok(handle) => {
                    info!(addr = %addr, "HTTP server listening");
                    return Ok(ServerHandle { addr, handle });
                }
                Err(e)
                    if requested.port() == 0
                        && e.kind() == io::ErrorKind::AddrInUse
                        && attempt < EPHEMERAL_BIND_ATTEMPTS =>
                {
                    warn!(addr = %addr, attempt, "Ephemeral port taken before bind, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
