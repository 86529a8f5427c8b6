// Neo4j GDS MCP 服务器
//
// 通过 stdio 与 LLM 客户端通信，将 GDS 图算法暴露为 MCP 工具

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use neo4j_gds_mcp::config::{load_dotenv, AppConfig, CliOverrides, ServerConfig, ServicesConfig};
use neo4j_gds_mcp::errors::AppError;
use neo4j_gds_mcp::gds::{schema, CypherExecutor, Neo4jClient, OfflineExecutor};
use neo4j_gds_mcp::logging::{init_logging, LoggingConfig, OperationTimer};
use neo4j_gds_mcp::mcp::{bridge, GdsMcpManager};

#[derive(Parser)]
#[command(name = "neo4j-gds-mcp", version)]
#[command(about = "Neo4j GDS MCP Server - 通过 MCP 提供 Graph Data Science 算法")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Neo4j 连接地址 (覆盖 NEO4J_URI)
    #[arg(long, global = true)]
    db_url: Option<String>,

    /// Neo4j 用户名 (覆盖 NEO4J_USERNAME)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Neo4j 密码 (覆盖 NEO4J_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// 数据库名称 (覆盖 NEO4J_DATABASE)
    #[arg(long, global = true)]
    database: Option<String>,

    /// .env 文件路径
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动 MCP 服务器 (默认)
    Serve,
    /// 列出所有工具，无需连接数据库
    ListTools,
    /// 显示服务器信息
    Info,
    /// 连接数据库并统计节点数
    Health,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db_url: self.db_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        Ok(AppConfig::load(self.config.as_deref(), &self.overrides())?)
    }
}

async fn connect(config: &AppConfig) -> Result<Arc<dyn CypherExecutor>, AppError> {
    let client = Neo4jClient::connect(&config.neo4j)
        .await
        .map_err(|e| AppError::Connection(e.to_string()))?;
    Ok(Arc::new(client))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let executor = connect(&config).await?;
    let manager = Arc::new(GdsMcpManager::new(&config.server, &config.services, executor));
    bridge::start_mcp_server(manager)
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;
    Ok(())
}

fn list_tools(cli: &Cli) {
    // 配置不完整时仍可列出工具
    let (server, services) = match cli.load_config() {
        Ok(config) => (config.server, config.services),
        Err(e) => {
            warn!("⚠️ 配置加载失败，使用默认服务组: {}", e);
            (ServerConfig::default(), ServicesConfig::default())
        }
    };
    let manager = GdsMcpManager::new(&server, &services, Arc::new(OfflineExecutor));
    for tool in manager.get_all_tools() {
        println!("{:<40} {}", tool.name, tool.description);
    }
}

fn info(config: &AppConfig) {
    println!("📦 {} {}", config.server.name, config.server.version);
    println!("🔗 Neo4j: {} (用户: {})", config.neo4j.uri, config.neo4j.username);
    println!(
        "📂 数据库: {}",
        config.neo4j.database.as_deref().unwrap_or("<default>")
    );
    println!("📡 服务: {}", config.services.enabled.join(", "));
    if let Some(log_file) = &config.server.log_file {
        println!("📝 日志文件: {}", log_file);
    }
}

async fn health(config: &AppConfig) -> anyhow::Result<()> {
    let timer = OperationTimer::new("health check");
    let executor = connect(config).await?;
    let count = schema::count_nodes(executor.as_ref())
        .await
        .map_err(|e| AppError::Connection(e.to_string()))?;
    let elapsed = timer.finish();
    println!("✅ Neo4j 可用: {} 个节点 (耗时: {:?})", count, elapsed);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    load_dotenv(cli.env_file.as_deref()).context("failed to load .env file")?;

    if let Some(Commands::ListTools) = cli.command {
        init_logging(LoggingConfig::server(cli.verbose, None));
        list_tools(&cli);
        return Ok(());
    }

    let config = cli.load_config().context("failed to load configuration")?;
    init_logging(LoggingConfig::server(cli.verbose, config.server.log_file.as_deref()));

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("🚀 启动 Neo4j GDS MCP 服务器");
            serve(config).await
        }
        Commands::Info => {
            info(&config);
            Ok(())
        }
        Commands::Health => health(&config).await,
        Commands::ListTools => Ok(()),
    };

    if let Err(e) = &result {
        error!("❌ {:#}", e);
    }
    result
}
