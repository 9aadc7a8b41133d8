use std::env;
use std::path::Path;
use std::sync::Arc;

use dotenvy::dotenv;

use opcms_crm_client::api::errors::ApiError;
use opcms_crm_client::api::http::HttpCustomerApi;
use opcms_crm_client::api::{DuplicateCheck, RemoteCollection};
use opcms_crm_client::domain::customer::{Customer, NewCustomer};
use opcms_crm_client::domain::query::QueryState;
use opcms_crm_client::domain::types::{CustomerKey, PageNumber, PageSize};
use opcms_crm_client::forms::customer::CustomerForm;
use opcms_crm_client::models;
use opcms_crm_client::models::config::ClientConfig;
use opcms_crm_client::services::export::write_csv;
use opcms_crm_client::services::list::{ListSynchronizer, RefreshOutcome};
use opcms_crm_client::session::Session;

const USAGE: &str = "usage: opcms-crm-client <command>

commands:
  list [search] [page]                  show one page of customers
  show <customer_id>                    show a single customer
  create <company> <contact> <phone>    create a customer
  delete <customer_id>                  delete a customer
  check <company>                       check whether a company name is taken
  export [search]                       write the first page as CSV to stdout";

fn print_row(customer: &Customer) {
    println!(
        "{}  {:<30}  {:<16}  {:<14}  {:<9}  {}",
        customer.key,
        customer.company_name,
        customer.contact_name,
        customer.contact_phone,
        customer.status.label(),
        customer.level.label(),
    );
}

async fn list(
    api: HttpCustomerApi,
    mut query: QueryState,
    search: Option<&str>,
    page: Option<&str>,
) -> Result<(), ApiError> {
    if let Some(search) = search {
        query.set_search(search);
    }
    if let Some(page) = page {
        let page = page
            .parse::<u32>()
            .map_err(|_| ApiError::Validation(format!("invalid page number: {page}")))?;
        query.set_page(PageNumber::new(page)?);
    }

    let sync = ListSynchronizer::with_query(api, query);
    if let RefreshOutcome::Failed(err) = sync.refresh().await {
        return Err(err);
    }

    let view = sync.view();
    let Some(result) = view.result else {
        return Ok(());
    };
    for customer in result.items() {
        print_row(customer);
    }
    let pages = result
        .page_links()
        .iter()
        .map(|link| match link {
            Some(n) if *n == result.page().get() as usize => format!("[{n}]"),
            Some(n) => n.to_string(),
            None => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!("{} customers  pages: {pages}", result.total());
    Ok(())
}

async fn run(command: &str, args: &[String], config: &ClientConfig) -> Result<(), ApiError> {
    let session = Arc::new(match &config.auth_token {
        Some(token) => Session::with_token(token.clone(), config.user_name.clone()),
        None => Session::new(),
    });
    let api = HttpCustomerApi::new(config, session)?;
    let query = QueryState::new().paginate(
        PageNumber::FIRST,
        PageSize::new(config.default_page_size)?,
    );
    let arg = |i: usize| args.get(i).map(String::as_str);

    match command {
        "list" => list(api, query, arg(0), arg(1)).await,
        "show" => {
            let key = arg(0).unwrap_or_default().parse::<CustomerKey>()?;
            let customer = api.fetch_one(&key).await?;
            print_row(&customer);
            Ok(())
        }
        "create" => {
            let form = CustomerForm {
                company_name: arg(0).unwrap_or_default().to_string(),
                contact_name: arg(1).unwrap_or_default().to_string(),
                contact_phone: arg(2).unwrap_or_default().to_string(),
                ..Default::default()
            };
            let draft = NewCustomer::try_from(form)?;
            let sync = ListSynchronizer::with_query(api, query);
            let customer = sync.create(&draft).await?;
            print_row(&customer);
            Ok(())
        }
        "delete" => {
            let key = arg(0).unwrap_or_default().parse::<CustomerKey>()?;
            let sync = ListSynchronizer::with_query(api, query);
            sync.delete(&key).await?;
            println!("Deleted {key}");
            Ok(())
        }
        "check" => {
            let result = api.check_duplicate(arg(0), None).await?;
            if result.is_duplicate {
                println!(
                    "Duplicate {}: {}",
                    result.duplicate_field.unwrap_or_default(),
                    result.duplicate_value.unwrap_or_default()
                );
            } else {
                println!("No duplicate found");
            }
            Ok(())
        }
        "export" => {
            let query = match arg(0) {
                Some(search) => query.search(search),
                None => query,
            };
            let page = api.fetch_page(&query).await?;
            write_csv(&page, std::io::stdout().lock())
                .map_err(|e| ApiError::Transient(format!("Failed to write CSV: {e}")))
        }
        _ => {
            eprintln!("{USAGE}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let client_config = match models::config::load(Path::new("config"), &app_env) {
        Ok(client_config) => client_config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    if let Err(err) = run(command, rest, &client_config).await {
        log::error!("{command} failed: {err}");
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
}
