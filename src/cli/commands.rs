//! Subcommands and their execution

use super::output::{
    print_list, print_one, OutputFormat, PLAN_COLUMNS, REGION_COLUMNS, REGISTRY_COLUMNS,
    REPOSITORY_COLUMNS,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use vultr_registry::{
    Client, Config, CreateRegistryRequest, DockerCredentialsOptions, ListOptions, Page,
    ResourceHandler, UpdateRegistryRequest, UpdateRepositoryRequest,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage container registries
    Registry {
        #[command(subcommand)]
        action: RegistryCommand,
    },
    /// Manage repositories of a registry
    Repository {
        #[command(subcommand)]
        action: RepositoryCommand,
    },
    /// Issue Docker credentials for a registry
    Credentials(CredentialsArgs),
    /// List regions offering container registries
    Regions(PageArgs),
    /// List registry plans
    Plans,
    /// Persist client settings (the API key is never saved)
    Configure(ConfigureArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Items per page
    #[arg(long)]
    pub per_page: Option<u32>,
    /// Cursor from a previous page
    #[arg(long)]
    pub cursor: Option<String>,
    /// Follow cursors until the last page
    #[arg(long)]
    pub all: bool,
}

impl PageArgs {
    fn options(&self) -> ListOptions {
        ListOptions {
            per_page: self.per_page,
            cursor: self.cursor.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// List registries
    List(PageArgs),
    /// Show one registry
    Get { id: String },
    /// Create a registry
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        plan: String,
        #[arg(long)]
        public: bool,
    },
    /// Change visibility or plan of a registry
    Update {
        id: String,
        #[arg(long, action = ArgAction::Set)]
        public: Option<bool>,
        #[arg(long)]
        plan: Option<String>,
    },
    /// Delete a registry
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum RepositoryCommand {
    /// List repositories of a registry
    List {
        registry: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one repository
    Get { registry: String, image: String },
    /// Change the description of a repository
    Update {
        registry: String,
        image: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a repository
    Delete { registry: String, image: String },
}

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    /// Registry id
    pub registry: String,
    /// Credential lifetime in seconds
    #[arg(long)]
    pub expiry_seconds: Option<u64>,
    /// Grant push access
    #[arg(long, action = ArgAction::Set)]
    pub write_access: Option<bool>,
    /// Write the credential to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ConfigureArgs {
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    #[arg(long)]
    pub retry_limit: Option<u32>,
}

/// Fetch one page, or every page when `--all` is given
async fn collect_pages<T, F, Fut>(page: &PageArgs, mut fetch: F) -> Result<Page<T>>
where
    T: DeserializeOwned,
    F: FnMut(ListOptions) -> Fut,
    Fut: Future<Output = vultr_registry::Result<Page<T>>>,
{
    let mut options = page.options();
    let first = fetch(options.clone()).await?;
    if !page.all {
        return Ok(first);
    }

    let mut items = Vec::new();
    let mut current = first;
    loop {
        tracing::debug!(
            "Fetched {} items, next cursor: {:?}",
            current.len(),
            current.next_cursor()
        );
        let next = options.next_page(&current.meta);
        let meta = current.meta.clone();
        items.extend(current.items);

        match next {
            Some(next) => {
                options = next;
                current = fetch(options.clone()).await?;
            }
            None => return Ok(Page { items, meta }),
        }
    }
}

fn print_page<T: Serialize>(
    format: OutputFormat,
    page: &Page<T>,
    columns: &[super::output::ColumnDef],
) -> Result<()> {
    print_list(format, &page.items, columns)?;
    if format == OutputFormat::Table {
        if let Some(next) = page.next_cursor() {
            eprintln!("{} total, more available: --cursor {}", page.meta.total, next);
        }
    }
    Ok(())
}

pub async fn run(command: Command, client: &Client, format: OutputFormat) -> Result<()> {
    match command {
        Command::Registry { action } => run_registry(action, client, format).await,
        Command::Repository { action } => run_repository(action, client, format).await,
        Command::Credentials(args) => run_credentials(args, client).await,
        Command::Regions(page) => {
            let regions = client.regions();
            let result =
                collect_pages(&page, |opts| async move { regions.list(Some(&opts)).await })
                    .await?;
            print_page(format, &result, REGION_COLUMNS)
        }
        Command::Plans => {
            let plans = client.plans().list().await?;
            let rows = plans
                .iter()
                .map(|(key, plan)| {
                    let mut row = serde_json::to_value(plan)?;
                    if let Value::Object(map) = &mut row {
                        map.insert("key".to_string(), Value::String(key.to_string()));
                    }
                    Ok(row)
                })
                .collect::<std::result::Result<Vec<Value>, serde_json::Error>>()?;
            print_list(format, &rows, PLAN_COLUMNS)
        }
        Command::Configure(args) => run_configure(args),
    }
}

async fn run_registry(
    action: RegistryCommand,
    client: &Client,
    format: OutputFormat,
) -> Result<()> {
    let registries = client.registries();

    match action {
        RegistryCommand::List(page) => {
            let result =
                collect_pages(&page, |opts| async move { registries.list(Some(&opts)).await })
                    .await?;
            print_page(format, &result, REGISTRY_COLUMNS)
        }
        RegistryCommand::Get { id } => {
            let registry = registries.get(&id).await?;
            print_one(format, &registry, REGISTRY_COLUMNS)
        }
        RegistryCommand::Create {
            name,
            region,
            plan,
            public,
        } => {
            let request = CreateRegistryRequest {
                name,
                public,
                region,
                plan,
            };
            let registry = registries.create(&request).await?;
            print_one(format, &registry, REGISTRY_COLUMNS)
        }
        RegistryCommand::Update { id, public, plan } => {
            let patch = UpdateRegistryRequest { public, plan };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update: pass --public and/or --plan");
            }
            let registry = registries.update(&id, &patch).await?;
            print_one(format, &registry, REGISTRY_COLUMNS)
        }
        RegistryCommand::Delete { id } => {
            registries.delete(&id).await?;
            eprintln!("Deleted registry {}", id);
            Ok(())
        }
    }
}

async fn run_repository(
    action: RepositoryCommand,
    client: &Client,
    format: OutputFormat,
) -> Result<()> {
    match action {
        RepositoryCommand::List { registry, page } => {
            let repositories = client.repositories(&registry);
            let repositories = &repositories;
            let result = collect_pages(&page, |opts| async move {
                repositories.list(Some(&opts)).await
            })
            .await?;
            print_page(format, &result, REPOSITORY_COLUMNS)
        }
        RepositoryCommand::Get { registry, image } => {
            let repository = client.repositories(&registry).get(&image).await?;
            print_one(format, &repository, REPOSITORY_COLUMNS)
        }
        RepositoryCommand::Update {
            registry,
            image,
            description,
        } => {
            let patch = UpdateRepositoryRequest { description };
            let repository = client.repositories(&registry).update(&image, &patch).await?;
            print_one(format, &repository, REPOSITORY_COLUMNS)
        }
        RepositoryCommand::Delete { registry, image } => {
            client.repositories(&registry).delete(&image).await?;
            eprintln!("Deleted repository {} from registry {}", image, registry);
            Ok(())
        }
    }
}

async fn run_credentials(args: CredentialsArgs, client: &Client) -> Result<()> {
    let options = DockerCredentialsOptions {
        expiry_seconds: args.expiry_seconds,
        write_access: args.write_access,
    };

    let credentials = client
        .docker_credentials(&args.registry)
        .create(&options)
        .await?;

    match args.out {
        Some(path) => {
            std::fs::write(&path, credentials.as_bytes())
                .with_context(|| format!("Failed to write credentials to {:?}", path))?;
            eprintln!("Wrote {} bytes to {:?}", credentials.len(), path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(credentials.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Update the config file. Only the file is read, so this works even when
/// the current file or environment holds unusable values.
pub fn run_configure(args: ConfigureArgs) -> Result<()> {
    match Config::config_path() {
        Some(path) => {
            configure_file(&path, args)?;
            eprintln!("Saved configuration to {:?}", path);
        }
        None => eprintln!("No config directory available; nothing saved"),
    }
    Ok(())
}

fn configure_file(path: &Path, args: ConfigureArgs) -> Result<()> {
    // Start from the file alone so environment overrides are not persisted
    let mut config = Config::load_from(path);
    if let Some(url) = args.base_url {
        config.base_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }
    if let Some(limit) = args.retry_limit {
        config.retry_limit = limit;
    }

    config.save_to(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use vultr_registry::{Links, Meta};

    fn canned(items: Vec<u32>, next: Option<&str>) -> Page<u32> {
        Page {
            items,
            meta: Meta {
                total: 5,
                links: Links {
                    next: next.map(String::from),
                    prev: None,
                },
            },
        }
    }

    fn serve(options: &ListOptions) -> Page<u32> {
        match options.cursor.as_deref() {
            None => canned(vec![1, 2], Some("c1")),
            Some("c1") => canned(vec![3, 4], Some("c2")),
            Some(_) => canned(vec![5], None),
        }
    }

    #[tokio::test]
    async fn test_collect_pages_follows_cursors_with_all() {
        let seen = RefCell::new(Vec::new());
        let args = PageArgs {
            per_page: Some(2),
            cursor: None,
            all: true,
        };

        let result = collect_pages(&args, |opts: ListOptions| {
            let page = serve(&opts);
            seen.borrow_mut().push(opts);
            async move { Ok::<_, vultr_registry::Error>(page) }
        })
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 2, 3, 4, 5]);
        assert!(!result.has_next());

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|o| o.per_page == Some(2)));
        let cursors: Vec<Option<&str>> = seen.iter().map(|o| o.cursor.as_deref()).collect();
        assert_eq!(cursors, [None, Some("c1"), Some("c2")]);
    }

    #[tokio::test]
    async fn test_collect_pages_fetches_once_without_all() {
        let calls = RefCell::new(0);
        let args = PageArgs {
            per_page: None,
            cursor: Some("c1".to_string()),
            all: false,
        };

        let result = collect_pages(&args, |opts: ListOptions| {
            *calls.borrow_mut() += 1;
            let page = serve(&opts);
            async move { Ok::<_, vultr_registry::Error>(page) }
        })
        .await
        .unwrap();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(result.items, vec![3, 4]);
        assert_eq!(result.next_cursor(), Some("c2"));
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_error() {
        let args = PageArgs {
            all: true,
            ..PageArgs::default()
        };

        let result = collect_pages(&args, |opts: ListOptions| async move {
            match opts.cursor {
                None => Ok(canned(vec![1], Some("c1"))),
                Some(_) => Err(vultr_registry::Error::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            }
        })
        .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_configure_repairs_unusable_file() {
        let dir = std::env::temp_dir().join(format!("vcr-configure-{}", std::process::id()));
        let path = dir.join("config.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, r#"{"base_url":"api.vultr.com","timeout_secs":9}"#).unwrap();

        // Fixing another field keeps the bad URL but must still save
        let args = ConfigureArgs {
            retry_limit: Some(2),
            ..ConfigureArgs::default()
        };
        configure_file(&path, args).unwrap();

        let saved = Config::load_from(&path);
        assert_eq!(saved.retry_limit, 2);
        assert_eq!(saved.timeout_secs, 9);
        assert_eq!(saved.base_url, "api.vultr.com");

        let args = ConfigureArgs {
            base_url: Some("https://api.vultr.com".to_string()),
            ..ConfigureArgs::default()
        };
        configure_file(&path, args).unwrap();
        assert!(Client::new(&Config::load_from(&path)).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
