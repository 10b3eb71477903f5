// Products command for listing downloadable products

use super::Context;
use crate::config::Architecture;
use crate::resolver;
use crate::ui;

pub async fn products(ctx: &Context) -> anyhow::Result<i32> {
    let catalog = ctx.load_catalog().await?;
    let selectable = resolver::select_latest_visible(&catalog, &ctx.allowed_platforms());

    if selectable.is_empty() {
        ui::warning(&format!("No downloadable products for {}", ctx.arch));
        return Ok(0);
    }

    ui::header(&format!("{} products found:", selectable.len()));
    let width = selectable.iter().map(|p| p.code.len()).max().unwrap_or(0);
    for p in &selectable {
        ui::status(
            &format!("{:<width$}", p.code),
            &format!("{} ({})", p.display_name, p.latest_version),
        );
    }

    if ctx.arch == Architecture::Arm64 {
        ui::dim("Products without an arm64 or universal build are not listed.");
    }
    Ok(0)
}
