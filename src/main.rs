#[actix_web::main]
async fn main() -> std::io::Result<()> {
    spectral_gateway_lib::run()
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))
}
