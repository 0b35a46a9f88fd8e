use clap::{Parser, Subcommand, ValueEnum};
use clinic_agents::config::{self, ClientConfig};
use clinic_agents::frontend::{self, BookingForm};
use clinic_agents::utils::{logger, validation::Validate};
use clinic_agents::{AgentClient, AgentReply};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clinic-cli")]
#[command(about = "Terminal client for the medical appointment agents")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file
    #[arg(short, long, global = true, env = "CLINIC_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "DOCTOR_AGENT_URL")]
    doctor_agent_url: Option<String>,

    #[arg(long, global = true, env = "BOOKING_AGENT_URL")]
    booking_agent_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show whether each agent answers its health check
    Status,
    /// Probe every endpoint of both agents
    Debug,
    /// List doctors, optionally by specialty
    Doctors {
        #[arg(long)]
        specialty: Option<String>,
    },
    /// Show available slots for a doctor
    Slots { doctor_id: String },
    /// Book an appointment
    Book {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        specialty: Option<String>,
        /// morning, afternoon or evening
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// List appointments, optionally for one patient
    Appointments {
        #[arg(long)]
        patient: Option<String>,
    },
    /// Cancel an appointment by id
    Cancel { appointment_id: String },
    /// Send a free-text message to an agent
    Chat {
        #[arg(long, value_enum, default_value_t = ChatAgent::Doctor)]
        agent: ChatAgent,
        message: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChatAgent {
    Doctor,
    Booking,
}

fn print_reply(reply: AgentReply) -> i32 {
    match reply.into_result() {
        Ok(data) => {
            println!("{}", data);
            0
        }
        Err(error) => {
            eprintln!("❌ {}", error);
            1
        }
    }
}

fn status_line(name: &str, url: &str, online: bool) -> String {
    if online {
        format!("🟢 {}: Online ({})", name, url)
    } else {
        format!("🔴 {}: Offline ({})", name, url)
    }
}

async fn execute(client: &AgentClient, command: Command) -> anyhow::Result<i32> {
    let code = match command {
        Command::Status => {
            let doctor = client.check_agent_status(client.doctor_agent_url()).await;
            let booking = client.check_agent_status(client.booking_agent_url()).await;
            println!(
                "{}",
                status_line("Doctor Directory Agent", client.doctor_agent_url(), doctor)
            );
            println!(
                "{}",
                status_line("Booking Agent", client.booking_agent_url(), booking)
            );
            if doctor && booking {
                0
            } else {
                1
            }
        }
        Command::Debug => {
            let report = serde_json::json!({
                "doctor_agent": {
                    "url": client.doctor_agent_url(),
                    "endpoints": client.test_agent_endpoints(client.doctor_agent_url()).await,
                },
                "booking_agent": {
                    "url": client.booking_agent_url(),
                    "endpoints": client.test_agent_endpoints(client.booking_agent_url()).await,
                },
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            0
        }
        Command::Doctors { specialty } => {
            let query = frontend::doctor_search_query(specialty.as_deref().unwrap_or_default());
            print_reply(client.query_doctor_directory(&query).await)
        }
        Command::Slots { doctor_id } => {
            let query = frontend::availability_query(&doctor_id);
            print_reply(client.query_doctor_directory(&query).await)
        }
        Command::Book {
            patient,
            specialty,
            time,
            phone,
        } => {
            let form = BookingForm {
                patient_name: patient,
                patient_phone: phone.unwrap_or_default(),
                specialty: specialty.unwrap_or_default(),
                time_preference: time.unwrap_or_default(),
            };
            print_reply(client.query_booking_agent(&frontend::booking_query(&form)).await)
        }
        Command::Appointments { patient } => {
            let query = frontend::appointments_query(patient.as_deref().unwrap_or_default());
            print_reply(client.query_booking_agent(&query).await)
        }
        Command::Cancel { appointment_id } => {
            let query = frontend::cancel_query(&appointment_id);
            print_reply(client.query_booking_agent(&query).await)
        }
        Command::Chat { agent, message } => {
            let message = message.join(" ");
            if message.trim().is_empty() {
                anyhow::bail!("message is empty");
            }
            let reply = match agent {
                ChatAgent::Doctor => client.query_doctor_directory(&message).await,
                ChatAgent::Booking => client.query_booking_agent(&message).await,
            };
            print_reply(reply)
        }
    };
    Ok(code)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    let file = config::load_optional(args.config.as_ref())?;
    let client_config = ClientConfig::resolve(
        file.as_ref(),
        args.doctor_agent_url,
        args.booking_agent_url,
        args.timeout,
    );
    if let Err(e) = client_config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let client = AgentClient::new(&client_config)?;
    let code = execute(&client, args.command).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
