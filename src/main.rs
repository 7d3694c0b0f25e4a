use clap::Parser;
use scribble_server::{args::Args, serve, setup_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();
    let args = Args::parse();
    serve(args.host, args.game_config()).await
}
