#![allow(dead_code)]

pub mod test_server {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod service {
    use schemaroute::dispatcher::HandlerResponse;
    use schemaroute::handlers::{build, Variant};
    use schemaroute::server::{AppService, ParsedRequest};

    /// A variant's service, driven in-process without a socket.
    pub fn demo_service(variant: Variant) -> AppService {
        super::test_server::setup_may_runtime();
        let (router, dispatcher) = build(variant, 0x10000).unwrap();
        AppService::new(router, dispatcher)
    }

    pub fn get(service: &AppService, target: &str) -> HandlerResponse {
        service.handle(&ParsedRequest::new("GET", target, None))
    }

    pub fn post(service: &AppService, target: &str, body: &str) -> HandlerResponse {
        service.handle(&ParsedRequest::new("POST", target, Some(body.as_bytes())))
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// A parsed HTTP/1.1 response.
    #[derive(Debug)]
    pub struct RawResponse {
        pub status: u16,
        pub content_type: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl RawResponse {
        /// First header named `name`, compared case-insensitively.
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }


        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    /// Send a raw request and read exactly one response, using `Content-Length`.
    pub fn send_request(addr: &SocketAddr, req: &str) -> RawResponse {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        stream.write_all(req.as_bytes()).unwrap();

        let mut buf = Vec::new();
        let mut tmp = [0u8; 1024];
        let header_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut tmp).unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&tmp[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut status = 0;
        let mut content_type = String::new();
        let mut content_length = 0;
        let mut headers = Vec::new();
        for line in head.lines() {
            if line.starts_with("HTTP/1.1") {
                status = line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
            } else if let Some((name, val)) = line.split_once(':') {
                headers.push((name.trim().to_string(), val.trim().to_string()));
                if name.eq_ignore_ascii_case("content-type") {
                    content_type = val.trim().to_string();
                } else if name.eq_ignore_ascii_case("content-length") {
                    content_length = val.trim().parse().unwrap();
                }
            }
        }

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut tmp).unwrap();
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&tmp[..n]);
        }
        let body =
            String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();

        RawResponse {
            status,
            content_type,
            headers,
            body,
        }
    }

    /// `GET target` with an empty body.
    pub fn get(addr: &SocketAddr, target: &str) -> RawResponse {
        send_request(
            addr,
            &format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        )
    }

    /// `POST target` with a JSON body.
    pub fn post_json(addr: &SocketAddr, target: &str, body: &str) -> RawResponse {
        send_request(
            addr,
            &format!(
                "POST {target} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            ),
        )
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }
}
