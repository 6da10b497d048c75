use clap::{Parser, Subcommand};
use log::{error, info, warn};
use room_probe::{
    run, Cancellation, Endpoint, ProbeError, ProbeSettings, Role, DEFAULT_HOST, DEFAULT_PORT,
};
use std::process;
use std::time::Duration;
use uuid::Uuid;

/// Room router probe. Emulates one party and logs what the router sends back.
#[derive(Parser, Debug)]
#[command(name = "room-probe", version)]
struct ProbeOptions {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    debug: bool,
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(short, long, default_value = "00000000-0000-0000-0000-000000000000")]
    client_id: Uuid,
    /// Connect over wss:// (needs the `tls` feature)
    #[arg(short, long)]
    secure: bool,
    /// Pause before each ping
    #[arg(long, default_value_t = 10)]
    send_interval_ms: u64,
    /// Longest a single receive may block
    #[arg(long, default_value_t = 1000)]
    recv_timeout_ms: u64,
    #[arg(long, default_value_t = 5000)]
    connect_timeout_ms: u64,
    /// Full ws:// URL. Overrides host, port, client id and room id
    #[arg(long)]
    url: Option<String>,
    #[command(subcommand)]
    role: RoleCommand,
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// Join a room and ping
    Client {
        #[arg(short, long, default_value_t = 0)]
        room_id: u32,
    },
    /// Announce the room list, then push room waves
    Server,
}

impl ProbeOptions {
    fn settings(&self) -> Result<ProbeSettings, ProbeError> {
        let (role, room_id) = match self.role {
            RoleCommand::Client { room_id } => (Role::Client, Some(room_id)),
            RoleCommand::Server => (Role::Server, None),
        };

        let endpoint = match &self.url {
            Some(url) => {
                let endpoint = Endpoint::parse(url)?;
                if endpoint.role() != role {
                    return Err(ProbeError::Config(format!(
                        "{} is a {} endpoint, not {}",
                        url,
                        endpoint.role(),
                        role
                    )));
                }
                endpoint
            }
            None if self.secure => {
                Endpoint::new_secure(&self.host, self.port, role, self.client_id, room_id)?
            }
            None => Endpoint::new(&self.host, self.port, role, self.client_id, room_id)?,
        };

        ProbeSettings::new(
            endpoint,
            Duration::from_millis(self.send_interval_ms),
            Duration::from_millis(self.recv_timeout_ms),
            Duration::from_millis(self.connect_timeout_ms),
        )
    }
}

fn init_logger(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let options = ProbeOptions::parse();
    init_logger(options.debug);

    let settings = match options.settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("EXITING: {}", e);
            process::exit(2);
        }
    };

    let cancel = Cancellation::new();
    let handler = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler.cancel()) {
        warn!("interrupt handler not installed: {}", e);
    }

    info!("probing {} as {}", settings.endpoint, settings.endpoint.role());
    let reason = run(&settings, &cancel);
    process::exit(if reason.is_fatal() { 1 } else { 0 });
}
