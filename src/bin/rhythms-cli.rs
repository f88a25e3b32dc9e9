use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "rhythms-cli")]
#[command(about = "Command line client for the random-rhythms API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    /// Bearer token from `register` or `login`
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and print its token
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        signup_code: String,
    },
    /// Log in and print a token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List concerts near a zip code
    Concerts {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        zip: String,
        #[arg(long)]
        radius: Option<u32>,
    },
    /// Show one concert
    Concert {
        id: String,
        #[arg(long)]
        zip: Option<String>,
    },
    /// Pick a random concert, optionally under a price ceiling
    Random {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        zip: String,
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long)]
        price: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let res = match cli.command {
        Commands::Register {
            email,
            password,
            name,
            signup_code,
        } => {
            client
                .post(format!("{}/auth/register", cli.url))
                .json(&json!({
                    "email": email,
                    "password": password,
                    "name": name,
                    "signupCode": signup_code,
                }))
                .send()
                .await?
        }
        Commands::Login { email, password } => {
            client
                .post(format!("{}/auth/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Concerts { from, to, zip, radius } => {
            let query = search_query(from, to, zip, radius);
            client
                .get(format!("{}/concerts", cli.url))
                .headers(headers)
                .query(&query)
                .send()
                .await?
        }
        Commands::Concert { id, zip } => {
            let query: Vec<(&str, String)> = zip.into_iter().map(|z| ("zipCode", z)).collect();
            client
                .get(format!("{}/concerts/{}", cli.url, id))
                .headers(headers)
                .query(&query)
                .send()
                .await?
        }
        Commands::Random {
            from,
            to,
            zip,
            radius,
            price,
        } => {
            let mut query = search_query(from, to, zip, radius);
            if let Some(price) = price {
                query.push(("price", price.to_string()));
            }
            client
                .get(format!("{}/concerts/random", cli.url))
                .headers(headers)
                .query(&query)
                .send()
                .await?
        }
    };

    print_response(res).await
}

fn search_query(from: String, to: String, zip: String, radius: Option<u32>) -> Vec<(&'static str, String)> {
    let mut query = vec![("dateFrom", from), ("dateTo", to), ("zipCode", zip)];
    if let Some(radius) = radius {
        query.push(("geoRadius", radius.to_string()));
    }
    query
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => println!("{}", serde_json::to_string_pretty(&json)?),
        Ok(json) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
        }
        Err(_) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}
