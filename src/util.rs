use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

const API_ADDR: &str = "STATUS_WATCH_API_ADDR";

const DEFAULT_API_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080));

pub fn get_api_addr() -> SocketAddr {
    let addr_from_env = std::env::var(API_ADDR);
    addr_from_env.map_or(DEFAULT_API_ADDR, |res| res.parse().unwrap_or(DEFAULT_API_ADDR))
}

const API_TOKEN: &str = "STATUS_WATCH_API_TOKEN";

pub fn get_api_token() -> Option<String> {
    let token_from_env = std::env::var(API_TOKEN);
    token_from_env.ok().filter(|token| !token.is_empty())
}
