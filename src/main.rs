use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use postie::Application;
use postie_core::logging::{init_from_config, LogFormat};
use postie_core::{AppConfig, EmailSendRequest, MailRequest, TemplateEmailSendRequest};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // 获取命令行参数
    let config_path = matches.get_one::<String>("config");

    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("<默认路径>")
        )
    })?;

    // 命令行显式指定的日志参数覆盖配置文件
    apply_log_overrides(&mut config, &matches)?;
    init_from_config(&config.observability)?;
    debug!("配置加载完成，默认邮件服务: {:?}", config.mailer.default_service);

    if let Some(("status", _)) = matches.subcommand() {
        ensure_shared_status_cache(&config)?;
    }

    let app = Application::new(config).await?;

    match matches.subcommand() {
        Some(("send", sub)) => run_send(&app, sub).await,
        Some(("status", sub)) => run_status(&app, sub).await,
        Some(("mailers", _)) => run_mailers(&app).await,
        _ => Err(anyhow::anyhow!("未知的子命令")),
    }
}

fn build_cli() -> Command {
    Command::new("postie")
        .version("1.0.0")
        .about("按别名分发的消息发送服务")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，默认使用配置中的 observability.log_level")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .global(true),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，默认使用配置中的 observability.log_format")
                .value_parser(["json", "pretty"])
                .global(true),
        )
        .subcommand(
            Command::new("send")
                .about("发送一封邮件并输出消息状态")
                .arg(
                    Arg::new("service")
                        .short('s')
                        .long("service")
                        .value_name("ALIAS")
                        .help("邮件服务别名，默认使用配置中的默认服务"),
                )
                .arg(
                    Arg::new("channel")
                        .long("channel")
                        .value_name("CHANNEL")
                        .help("发送渠道")
                        .default_value(postie_core::DEFAULT_CHANNEL),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_name("ADDRESS")
                        .help("收件人，可重复")
                        .action(ArgAction::Append)
                        .required(true),
                )
                .arg(
                    Arg::new("template")
                        .long("template")
                        .value_name("NAME")
                        .help("模板名称")
                        .conflicts_with_all(["subject", "body"]),
                )
                .arg(
                    Arg::new("var")
                        .long("var")
                        .value_name("KEY=VALUE")
                        .help("模板变量，可重复")
                        .action(ArgAction::Append)
                        .requires("template"),
                )
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .value_name("TEXT")
                        .help("邮件主题")
                        .required_unless_present("template"),
                )
                .arg(
                    Arg::new("body")
                        .long("body")
                        .value_name("TEXT")
                        .help("邮件正文")
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("查询消息状态")
                .arg(Arg::new("id").value_name("MESSAGE_ID").required(true)),
        )
        .subcommand(Command::new("mailers").about("列出已注册的邮件服务及健康状态"))
}

fn apply_log_overrides(config: &mut AppConfig, matches: &ArgMatches) -> Result<()> {
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        format.parse::<LogFormat>()?;
        config.observability.log_format = format.clone();
    }
    Ok(())
}

/// 内存缓存只存在于单个进程内，`status` 无法读到其他进程写入的记录
fn ensure_shared_status_cache(config: &AppConfig) -> Result<()> {
    if config.cache.backend == "memory" {
        return Err(anyhow::anyhow!(
            "status 命令需要跨进程共享的缓存，当前缓存后端为 memory；\
             请在配置中设置 [cache] backend = \"redis\""
        ));
    }
    Ok(())
}

async fn run_send(app: &Application, matches: &ArgMatches) -> Result<()> {
    let request = build_request(matches)?;
    let alias = matches.get_one::<String>("service").map(String::as_str);
    let service = app.email_service();

    let status = match request {
        MailRequest::Template(request) if alias.is_none() => {
            service.send_template_email(request).await?
        }
        request => service.dispatch(alias, request).await?,
    };

    info!("消息 {} 状态: {}", status.message_id, status.status);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn run_status(app: &Application, matches: &ArgMatches) -> Result<()> {
    let id = matches
        .get_one::<String>("id")
        .context("缺少消息ID")?;

    let status = app.email_service().message_status(id).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn run_mailers(app: &Application) -> Result<()> {
    let health = app.mailer_health().await?;
    let default = app.config().mailer.default_service.as_deref();

    for (alias, healthy) in health {
        let driver = app
            .config()
            .mailer
            .services
            .get(&alias)
            .map(|s| s.driver.as_str())
            .unwrap_or("-");
        let marker = if Some(alias.as_str()) == default { "*" } else { " " };
        let state = if healthy { "healthy" } else { "unhealthy" };
        println!("{marker} {alias:<20} {driver:<8} {state}");
    }
    Ok(())
}

fn build_request(matches: &ArgMatches) -> Result<MailRequest> {
    let recipients: Vec<String> = matches
        .get_many::<String>("to")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let channel = matches
        .get_one::<String>("channel")
        .cloned()
        .unwrap_or_else(|| postie_core::DEFAULT_CHANNEL.to_string());

    if let Some(template) = matches.get_one::<String>("template") {
        let mut request = TemplateEmailSendRequest::new(template, recipients).with_channel(channel);
        for var in matches.get_many::<String>("var").into_iter().flatten() {
            let (key, value) = parse_var(var)?;
            request = request.with_variable(key, value);
        }
        return Ok(request.into());
    }

    let subject = matches
        .get_one::<String>("subject")
        .context("普通邮件需要 --subject")?;
    let body = matches
        .get_one::<String>("body")
        .map(String::as_str)
        .unwrap_or_default();
    Ok(EmailSendRequest::new(subject, body, recipients)
        .with_channel(channel)
        .into())
}

/// 解析 `key=value`，值能按JSON解析时保留其类型，否则作为字符串
fn parse_var(raw: &str) -> Result<(String, serde_json::Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("模板变量格式应为 key=value: {raw}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow::anyhow!("模板变量名不能为空: {raw}"));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("name=Ada").unwrap(),
            ("name".to_string(), serde_json::json!("Ada"))
        );
        assert_eq!(
            parse_var("count=3").unwrap(),
            ("count".to_string(), serde_json::json!(3))
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_build_template_request() {
        let matches = build_cli()
            .try_get_matches_from([
                "postie", "send", "--to", "a@example.com", "--to", "b@example.com",
                "--template", "welcome", "--var", "name=Ada",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();

        match build_request(sub).unwrap() {
            MailRequest::Template(request) => {
                assert_eq!(request.template, "welcome");
                assert_eq!(request.recipients.len(), 2);
                assert_eq!(request.variables["name"], serde_json::json!("Ada"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_build_plain_request() {
        let matches = build_cli()
            .try_get_matches_from([
                "postie", "send", "--to", "a@example.com", "--subject", "Hi", "--body", "Hello",
                "--channel", "alerts",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();

        let request = build_request(sub).unwrap();
        assert_eq!(request.kind(), "plain");
        assert_eq!(request.channel(), "alerts");
    }

    #[test]
    fn test_log_settings_come_from_config_by_default() {
        let mut config = AppConfig::default();
        config.observability.log_level = "debug".to_string();
        config.observability.log_format = "json".to_string();

        let matches = build_cli()
            .try_get_matches_from(["postie", "mailers"])
            .unwrap();
        apply_log_overrides(&mut config, &matches).unwrap();

        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "json");
    }

    #[test]
    fn test_explicit_log_flags_override_config() {
        let mut config = AppConfig::default();
        config.observability.log_format = "json".to_string();

        let matches = build_cli()
            .try_get_matches_from(["postie", "-l", "warn", "--log-format", "pretty", "mailers"])
            .unwrap();
        apply_log_overrides(&mut config, &matches).unwrap();

        assert_eq!(config.observability.log_level, "warn");
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_status_requires_shared_cache() {
        let mut config = AppConfig::default();
        assert_eq!(config.cache.backend, "memory");
        let err = ensure_shared_status_cache(&config).unwrap_err();
        assert!(err.to_string().contains("redis"));

        config.cache.backend = "redis".to_string();
        assert!(ensure_shared_status_cache(&config).is_ok());
    }

    #[test]
    fn test_send_requires_subject_or_template() {
        let result = build_cli().try_get_matches_from(["postie", "send", "--to", "a@example.com"]);
        assert!(result.is_err());
    }
}
