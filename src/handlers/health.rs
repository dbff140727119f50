pub async fn root() -> &'static str {
    "Decor booking server is running"
}

pub async fn health() -> &'static str {
    "OK"
}
