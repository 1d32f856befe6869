use std::sync::Arc;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::client::{DynGenAiClient, GeminiClient};
use crate::config::Config;
use crate::imagery::PLACEHOLDER_IMAGE_URL;
use crate::orchestrator::{PlanOrchestrator, PlanSnapshot, PlanStatus};
use crate::planner::{DailyPlan, MealSlot, Recipe};

pub(crate) async fn handle_plan(config: &Config) -> Result<()> {
    let client: Arc<DynGenAiClient> =
        Arc::new(GeminiClient::new(&config.gemini).context("Failed to build Gemini client")?);
    let orchestrator = PlanOrchestrator::new(client, config.models.clone());
    let mut updates = orchestrator.subscribe();

    let render_progress = async {
        let mut header_shown = false;
        let mut announced = [false; 3];
        loop {
            if updates.changed().await.is_err() {
                break;
            }
            let snapshot = updates.borrow_and_update().clone();
            match snapshot.status {
                PlanStatus::Idle => {}
                PlanStatus::Loading => {
                    println!("{}", "正在联络 AI 营养专家...".green());
                }
                PlanStatus::ImagesLoading => {
                    announce_images(&snapshot, &mut header_shown, &mut announced);
                }
                PlanStatus::Ready | PlanStatus::Error => {
                    announce_images(&snapshot, &mut header_shown, &mut announced);
                    break;
                }
            }
        }
    };

    let (_, _) = tokio::join!(orchestrator.refresh(), render_progress);

    let snapshot = orchestrator.snapshot();
    match snapshot.status {
        PlanStatus::Ready => {
            if let Some(plan) = &snapshot.plan {
                render_plan(plan);
            }
            Ok(())
        }
        PlanStatus::Error => {
            let message = snapshot
                .error
                .unwrap_or_else(|| "调取失败，请稍后再试。".to_string());
            bail!("{message}")
        }
        other => bail!("plan flow ended in unexpected state {other:?}"),
    }
}

fn announce_images(snapshot: &PlanSnapshot, header_shown: &mut bool, announced: &mut [bool; 3]) {
    let Some(plan) = snapshot.plan.as_ref() else {
        return;
    };
    if !*header_shown {
        println!("{}", "今日食谱已生成，AI 正在为您绘制精美餐图...".green());
        *header_shown = true;
    }
    for (idx, slot) in MealSlot::ALL.iter().enumerate() {
        if !announced[idx] && plan.recipe(*slot).image_url.is_some() {
            println!("  {} {}配图完成", "✓".green(), slot);
            announced[idx] = true;
        }
    }
}

fn render_plan(plan: &DailyPlan) {
    println!();
    println!(
        "{}  {}",
        "今日养生方案".bold().green(),
        plan.date.as_str().dimmed()
    );
    println!("{} {}", "今日养生心法:".yellow().bold(), plan.daily_tip);

    for recipe in plan.recipes() {
        render_recipe(recipe);
    }
}

fn render_recipe(recipe: &Recipe) {
    println!();
    println!(
        "{} {}",
        format!("[{}]", recipe.slot).cyan().bold(),
        recipe.title.bold()
    );
    println!("  食材: {}", recipe.ingredients.join("、"));
    println!("  做法: {}", recipe.cooking_method);
    println!("  功效: {}", recipe.benefits);
    println!("  配图: {}", describe_image(recipe.image_url.as_deref()));
}

fn describe_image(url: Option<&str>) -> String {
    match url {
        Some(url) if url.starts_with("data:image/") => "AI 配图已生成".to_string(),
        Some(url) if url == PLACEHOLDER_IMAGE_URL => format!("使用占位图 {url}"),
        Some(url) => url.to_string(),
        None => "未生成".to_string(),
    }
}
