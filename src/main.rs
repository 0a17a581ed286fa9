use clap::Parser;
use splitroute::{
    cli::{Args, execute},
    error::RouteError,
};

#[tokio::main]
async fn main() -> Result<(), RouteError> {
    env_logger::init();

    let args = Args::parse();

    execute(args).await
}
