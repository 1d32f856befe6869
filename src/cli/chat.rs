use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::advisor::{self, ChatRole};
use crate::client::{DynGenAiClient, GeminiClient};
use crate::config::Config;
use crate::orchestrator::{ChatOrchestrator, ChatSnapshot, SubmitOutcome};

use super::args::ChatArgs;

const STARTER_QUESTIONS: [&str; 5] = [
    "高血糖早餐吃什么？",
    "晚上睡不着，吃什么好？",
    "每天吃多少盐合适？",
    "降压操怎么配合饮食？",
    "五谷杂粮怎么搭配最养胃？",
];

pub(crate) async fn handle_chat(args: ChatArgs, config: &Config) -> Result<()> {
    let client: Arc<DynGenAiClient> =
        Arc::new(GeminiClient::new(&config.gemini).context("Failed to build Gemini client")?);

    let question = args.question.join(" ").trim().to_owned();
    if !question.is_empty() {
        let reply = match advisor::send_message(client.as_ref(), &config.models, &[], &question)
            .await
        {
            Ok(reply) => reply,
            Err(error) if error.is_credential() => {
                bail!("尚未配置 GEMINI_API_KEY，请在环境变量或 .env 文件中设置后重试")
            }
            Err(error) => return Err(error).context("营养师暂时联系不上，请稍后再试"),
        };
        println!("{reply}");
        return Ok(());
    }

    interactive(client, config).await
}

async fn interactive(client: Arc<DynGenAiClient>, config: &Config) -> Result<()> {
    let orchestrator = ChatOrchestrator::new(client, config.models.clone());

    println!("{}", "AI 养生营养师已上线，输入 exit 结束对话。".green());
    println!("{}", "老人家都在问:".dimmed());
    for question in STARTER_QUESTIONS {
        println!("  {} {}", "·".dimmed(), question.dimmed());
    }
    if let Some(greeting) = orchestrator.snapshot().history.first() {
        println!();
        println!("{} {}", "营养师:".cyan().bold(), greeting.content);
    }

    loop {
        print!("\n{} ", "您:".bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim().to_owned();
        if input.eq_ignore_ascii_case("exit")
            || input.eq_ignore_ascii_case("quit")
            || input == "再见"
        {
            println!("{}", "祝您身体健康，再见！".green());
            break;
        }
        if input.is_empty() {
            continue;
        }

        let printer = spawn_reply_printer(orchestrator.subscribe());
        match orchestrator.submit(&input).await {
            SubmitOutcome::Completed => {
                printer.await.ok();
                println!();
            }
            SubmitOutcome::Empty | SubmitOutcome::Busy => {
                printer.abort();
            }
        }
    }

    Ok(())
}

/// Prints the streamed assistant reply as the orchestrator publishes it.
fn spawn_reply_printer(mut updates: watch::Receiver<ChatSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut printed = 0usize;
        let mut label_shown = false;
        let mut started = false;
        loop {
            if updates.changed().await.is_err() {
                break;
            }
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.busy {
                started = true;
            }
            if started
                && let Some(reply) = snapshot.history.last()
                && reply.role == ChatRole::Assistant
            {
                if !label_shown {
                    print!("{} ", "营养师:".cyan().bold());
                    label_shown = true;
                }
                // Chunk boundaries are char boundaries, byte offsets are safe.
                if reply.content.len() > printed {
                    print!("{}", &reply.content[printed..]);
                    io::stdout().flush().ok();
                    printed = reply.content.len();
                }
            }
            if started && !snapshot.busy {
                break;
            }
        }
    })
}
