use pbxadmin::prelude::*;
use pbxadmin::{AppBuilder, Config};

#[tokio::main]
async fn main() -> ClResult<()> {
	pbxadmin::app::init_tracing();

	let config = Config::from_env().inspect_err(|err| error!("FATAL: {}", err))?;
	AppBuilder::from_config(&config).await?.run().await.inspect_err(|err| error!("FATAL: {}", err))
}

// vim: ts=4
