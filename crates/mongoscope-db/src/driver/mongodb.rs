//! MongoDB driver
//!
//! Maps [`DialConfig`] onto the official driver's [`ClientOptions`] and uses
//! explicit [`ClientSession`]s as the per-call handles.

use ::mongodb::bson::{Document, doc};
use ::mongodb::options::{ClientOptions, Credential, ServerAddress};
use ::mongodb::{Client, ClientSession, Collection};
use async_trait::async_trait;

use super::SessionDriver;
use crate::config::DialConfig;
use crate::error::DriverError;

/// Database the liveness probe is sent to
const PING_DATABASE: &str = "admin";

/// [`SessionDriver`] backed by the official `mongodb` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

impl MongoDriver {
	pub fn new() -> Self {
		Self
	}

	/// Build driver options from a dial configuration
	///
	/// `timeout` bounds server selection. With `fail_fast` it also bounds every
	/// socket connect attempt, so an unreachable seed list fails within
	/// `timeout` instead of the driver's longer connect default.
	pub fn client_options(config: &DialConfig) -> Result<ClientOptions, DriverError> {
		let hosts = config
			.addresses
			.iter()
			.map(ServerAddress::parse)
			.collect::<Result<Vec<_>, _>>()?;

		let mut options = ClientOptions::builder().hosts(hosts).build();
		options.server_selection_timeout = Some(config.timeout);
		if config.fail_fast {
			options.connect_timeout = Some(config.timeout);
		}
		if config.direct {
			options.direct_connection = Some(true);
		}
		options.repl_set_name = config.replica_set.clone();
		options.app_name = config.app_name.clone();
		options.max_pool_size = config.pool_limit;

		if config.username.is_some() {
			let mut credential = Credential::default();
			credential.username = config.username.clone();
			credential.password = config.password.clone();
			credential.source = config.source.clone();
			options.credential = Some(credential);
		}

		Ok(options)
	}
}

#[async_trait]
impl SessionDriver for MongoDriver {
	type Connection = Client;
	type Session = ClientSession;
	type Collection = Collection<Document>;

	async fn dial(&self, config: &DialConfig) -> Result<Client, DriverError> {
		let options = Self::client_options(config)?;
		let client = Client::with_options(options)?;

		// The client connects lazily; probe once so an unreachable server
		// surfaces here rather than in the first query.
		client
			.database(PING_DATABASE)
			.run_command(doc! { "ping": 1 })
			.await?;

		Ok(client)
	}

	async fn clone_session(&self, base: &Client) -> Result<ClientSession, DriverError> {
		Ok(base.start_session().await?)
	}

	fn collection(&self, base: &Client, database: &str, name: &str) -> Collection<Document> {
		base.database(database).collection::<Document>(name)
	}

	async fn ping(&self, base: &Client, session: &mut ClientSession) -> Result<(), DriverError> {
		base.database(PING_DATABASE)
			.run_command(doc! { "ping": 1 })
			.session(session)
			.await?;
		Ok(())
	}

	fn release(&self, session: ClientSession) {
		// Dropping returns the server session to the client's pool.
		drop(session);
	}

	async fn close(&self, base: &Client) {
		base.clone().shutdown().await;
	}
}
