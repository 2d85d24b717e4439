//!
//! simscan CLI binary
//! -------------------
//! Command-line tool and interactive interpreter for the simscan
//! document-analysis HTTP API. Holds one client session per invocation:
//! rehydrates it from the persisted token at startup, then runs a one-shot
//! command (`--cmd`) or the interpreter.

use std::env;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use simscan::cli::{
    render_admin_stats, render_ai_result, render_dashboard, render_results, render_scan_outcome,
    DEFAULT_ADMIN_WHATSAPP,
};
use simscan::client::models::ReportFormat;
use simscan::client::ApiClient;
use simscan::identity::{AuthState, SessionManager, TokenStore};
use simscan::system_paths;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --cmd \"<command>\" [--base <url>] [--home <dir>] [--json]\n  {program} --repl [--base <url>] [--home <dir>] [--json]\n\nFlags:\n  --base <url>       API base URL (default: http://127.0.0.1:8000, env SIMSCAN_API_URL)\n  --home <dir>       Client home holding the session token (default: ~/.simscan, env SIMSCAN_HOME)\n  --cmd <command>    Run a single command and exit\n  --repl             Start the interactive interpreter\n  --json             Print raw payloads as JSON instead of formatted text\n  -h, --help         Show this help\n\nCommands (one-shot or interactive):\n  login <email> <password>        sign in and persist the session token\n  logout                          clear the session, in memory and on disk\n  register <email> <password>     create an account\n  forgot <email>                  request a password reset email\n  reset <token> <password>        set a new password with a reset token\n  whoami                          show the signed-in account\n  dashboard                       batches/documents overview and credits\n  credits                         scan credit balance\n  ai-check <file|->               AI-authorship analysis of a text file or stdin\n  scan <file>                     one-shot plagiarism scan of a document\n  upload <type> <file...>         upload documents (type: plagiarism, ai, both)\n  batch <id>                      processing status of a batch\n  results <id>                    similarity findings of a batch\n  export <csv|pdf> <id> [out]     download a batch report\n  admin stats                     service-wide statistics\n  health                          ping the service\n  status                          show session and connection info\n  help                            show this help\n  quit | exit                     leave the interpreter\n\nExamples:\n  {program} --cmd \"login me@example.com hunter2\"\n  {program} --cmd \"results 1f0b6c9e-8f44-4e7b-9d31-2a4a8d5d9f10\"\n  echo \"some suspicious text\" | {program} --cmd \"ai-check -\"\n  {program} --repl --base https://scan.example.com"
    );
}

fn parse_env(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

fn main() -> Result<()> {
    println!(
        r"   _____ _
  / ___/(_)___ ___  ______________ _____
  \__ \/ / __ `__ \/ ___/ ___/ __ `/ __ \
 ___/ / / / / / / (__  ) /__/ /_/ / / / /
/____/_/_/ /_/ /_/____/\___/\__,_/_/ /_/
       document analysis client"
    );
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut base: Option<String> = None;
    let mut home: Option<String> = None;
    let mut cmd: Option<String> = None;
    let mut repl = false;
    let mut json_out = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--base" => {
                if i + 1 >= args.len() { eprintln!("--base requires a URL"); print_usage(&program); std::process::exit(2); }
                base = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--home" => {
                if i + 1 >= args.len() { eprintln!("--home requires a directory"); print_usage(&program); std::process::exit(2); }
                home = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--cmd" => {
                if i + 1 >= args.len() { eprintln!("--cmd requires a command"); print_usage(&program); std::process::exit(2); }
                cmd = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--repl" => { repl = true; i += 1; continue; }
            "--json" => { json_out = true; i += 1; continue; }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                // Allow passing the command without the flag as a single arg
                if cmd.is_none() { cmd = Some(unk.to_string()); i += 1; continue; }
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let base = base
        .or_else(|| parse_env("SIMSCAN_API_URL"))
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let home = home.map(PathBuf::from).unwrap_or_else(system_paths::default_home);
    let admin_number = parse_env("SIMSCAN_ADMIN_WHATSAPP").unwrap_or_else(|| DEFAULT_ADMIN_WHATSAPP.to_string());

    let session = Arc::new(SessionManager::new(TokenStore::new(system_paths::token_file(&home))));
    let client = ApiClient::new(&base, session).with_context(|| format!("invalid API base URL {}", base))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    // Rebuild the session from the persisted token before the first command.
    match rt.block_on(client.rehydrate()) {
        Ok(AuthState::Authenticated) => {
            if let Some(user) = client.session().snapshot().user {
                println!("session: signed in as {}", user.email);
            }
        }
        Ok(AuthState::Pending) => println!("session: token held, profile not verified (server unreachable?)"),
        Ok(AuthState::Anonymous) => {}
        Err(err) => eprintln!("session: {}", err),
    }

    if let Some(line) = cmd {
        return match run_command(&rt, &client, &admin_number, json_out, line.trim()) {
            Ok(()) => Ok(()),
            Err(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        };
    }

    if !repl {
        print_usage(&program);
        std::process::exit(2);
    }

    // Interactive interpreter
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("simscan interpreter. Type 'help' for commands.");
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        if stdin.read_line(&mut input).is_err() { break; }
        if input.is_empty() { break; }
        let line = input.trim();
        if line.is_empty() { continue; }
        let up = line.to_uppercase();
        if up == "EXIT" || up == "QUIT" { break; }
        if up == "HELP" {
            print_usage(&program);
            continue;
        }
        if let Err(err) = run_command(&rt, &client, &admin_number, json_out, line) {
            eprintln!("error: {}", err);
        }
    }
    Ok(())
}

fn run_command(
    rt: &tokio::runtime::Runtime,
    client: &ApiClient,
    admin_number: &str,
    json_out: bool,
    line: &str,
) -> Result<()> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&verb) = parts.first() else { return Ok(()) };

    match verb.to_ascii_lowercase().as_str() {
        "login" => {
            if parts.len() < 3 { return Err(anyhow!("usage: login <email> <password>")); }
            let user = rt.block_on(client.sign_in(parts[1], parts[2]))?;
            match user {
                Some(user) => println!("signed in as {} ({})", user.email, user.role),
                None => println!("signed in; profile not verified yet"),
            }
            Ok(())
        }
        "logout" => {
            client.sign_out();
            println!("signed out");
            Ok(())
        }
        "register" => {
            if parts.len() < 3 { return Err(anyhow!("usage: register <email> <password>")); }
            rt.block_on(client.register(parts[1], parts[2]))?;
            println!("registered; you can now sign in");
            Ok(())
        }
        "forgot" => {
            if parts.len() < 2 { return Err(anyhow!("usage: forgot <email>")); }
            rt.block_on(client.forgot_password(parts[1]))?;
            println!("reset email requested for {}", parts[1]);
            Ok(())
        }
        "reset" => {
            if parts.len() < 3 { return Err(anyhow!("usage: reset <token> <password>")); }
            rt.block_on(client.reset_password(parts[1], parts[2]))?;
            println!("password updated; you can now sign in");
            Ok(())
        }
        "whoami" => {
            let user = rt.block_on(client.current_user())?;
            if json_out {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("{} ({}), id {}", user.email, user.role, user.id);
            }
            Ok(())
        }
        "dashboard" => {
            let metrics = rt.block_on(client.dashboard())?;
            let credits = rt.block_on(client.credits())?;
            if json_out {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
                println!("{{\"credits\": {}}}", credits);
            } else {
                let email = client
                    .session()
                    .snapshot()
                    .user
                    .map(|u| u.email)
                    .unwrap_or_default();
                print!("{}", render_dashboard(&metrics, credits, &email, admin_number));
            }
            Ok(())
        }
        "credits" => {
            let credits = rt.block_on(client.credits())?;
            println!("scan credits: {}", credits);
            Ok(())
        }
        "ai-check" => {
            if parts.len() < 2 { return Err(anyhow!("usage: ai-check <file|->")); }
            let text = if parts[1] == "-" {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf).context("failed to read text from stdin")?;
                buf
            } else {
                std::fs::read_to_string(parts[1]).with_context(|| format!("cannot read {}", parts[1]))?
            };
            let result = rt.block_on(client.ai_check(&text))?;
            if json_out {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_ai_result(&result));
            }
            Ok(())
        }
        "scan" => {
            if parts.len() < 2 { return Err(anyhow!("usage: scan <file>")); }
            let outcome = rt.block_on(client.check_plagiarism(std::path::Path::new(parts[1])))?;
            if json_out {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            } else {
                print!("{}", render_scan_outcome(&outcome));
            }
            Ok(())
        }
        "upload" => {
            if parts.len() < 3 { return Err(anyhow!("usage: upload <plagiarism|ai|both> <file...>")); }
            let analysis_type = parts[1];
            let paths: Vec<PathBuf> = parts[2..].iter().map(PathBuf::from).collect();
            let batch_id = rt.block_on(client.upload_documents(&paths, analysis_type))?;
            println!("accepted; batch {}", batch_id);
            Ok(())
        }
        "batch" => {
            if parts.len() < 2 { return Err(anyhow!("usage: batch <id>")); }
            let batch = rt.block_on(client.batch(parts[1]))?;
            if json_out {
                println!("{}", serde_json::to_string_pretty(&batch)?);
            } else {
                println!("batch {}: {} ({} docs, {})", batch.id, batch.status, batch.total_docs, batch.analysis_type);
            }
            Ok(())
        }
        "results" => {
            if parts.len() < 2 { return Err(anyhow!("usage: results <id>")); }
            let rows = rt.block_on(client.batch_results(parts[1]))?;
            if json_out {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", render_results(&rows));
            }
            Ok(())
        }
        "export" => {
            if parts.len() < 3 { return Err(anyhow!("usage: export <csv|pdf> <id> [out]")); }
            let format: ReportFormat = parts[1].parse().map_err(|e| anyhow!("{}", e))?;
            let out = match parts.get(3) {
                Some(p) => PathBuf::from(p),
                None => system_paths::downloads_dir(&system_paths::default_home())
                    .join(format!("report_{}.{}", parts[2], format.as_str())),
            };
            let bytes = rt.block_on(client.export_report(parts[2], format, &out))?;
            println!("wrote {} bytes to {}", bytes, out.display());
            Ok(())
        }
        "admin" => {
            if parts.get(1).map(|s| s.to_ascii_lowercase()) != Some("stats".to_string()) {
                return Err(anyhow!("usage: admin stats"));
            }
            let stats = rt.block_on(client.admin_stats())?;
            if json_out {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", render_admin_stats(&stats));
            }
            Ok(())
        }
        "health" => {
            rt.block_on(client.health())?;
            println!("service is healthy");
            Ok(())
        }
        "status" => {
            let snap = client.session().snapshot();
            let state = match snap.state {
                AuthState::Authenticated => "signed in",
                AuthState::Pending => "pending verification",
                AuthState::Anonymous => "signed out",
            };
            match snap.user {
                Some(user) => println!("{} as {} against {}", state, user.email, client.base()),
                None => println!("{} against {}", state, client.base()),
            }
            Ok(())
        }
        other => Err(anyhow!("unknown command: {} (try 'help')", other)),
    }
}
