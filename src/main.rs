use budget_docgen::{cli, config, error, export, importer, projector, scanner, session};
use budget_docgen_common::{format_work_list, BaseInfoKey, ItemEdit, LineItem, LineItemDraft};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use dialoguer::{Confirm, Input};
use error::{BudgetError, Result};
use session::AppState;
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    budget_docgen::init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    // 设置命令不需要读取账本
    let command = cli.command;
    if let Commands::Config { .. } = command {
        return configure(config, command);
    }

    let (mut state, warnings) = AppState::open(config);
    for warning in warnings {
        println!("⚠ {}", warning);
    }

    match command {
        Commands::Import { file, quantity_source, yes } => {
            println!("📥 budget-docgen - 预算表导入\n");

            if !state.ledger.is_empty() && !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "当前账本有{}个项目，导入后将被覆盖，是否继续？",
                        state.ledger.len()
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| BudgetError::Cli(e.to_string()))?;
                if !confirmed {
                    println!("已取消");
                    return Ok(());
                }
            }

            let options = importer::ImportOptions {
                quantity_source: quantity_source.unwrap_or(state.config.quantity_source),
            };
            println!("[1/2] 读取预算表... (工程量来源: {})", options.quantity_source);
            let imported = state.import(&file, options)?;
            println!(
                "✔ 施工项目{}个，材料项目{}个",
                imported.construction.len(),
                imported.material.len()
            );
            if imported.skipped_rows > 0 {
                println!("  跳过空行{}行", imported.skipped_rows);
            }

            println!("[2/2] 保存本地数据...");
            persist(&state);
            println!("\n✅ 导入完成");
        }

        Commands::List { category, billable } => {
            let items: Vec<&LineItem> = state
                .ledger
                .items()
                .iter()
                .filter(|i| category.map_or(true, |c| i.category == c))
                .filter(|i| !billable || i.quantity > 0.0)
                .collect();
            if state.ledger.is_empty() {
                println!("账本为空，请先导入预算表 (budget-docgen import <文件>)");
            } else {
                print_items(&items);
            }
            print_totals(&state);
        }

        Commands::Add { category, name, price, unit, quantity, length } => {
            let draft = LineItemDraft {
                category,
                name,
                unit: unit.unwrap_or_default(),
                unit_price: price,
                quantity,
                is_length_unit: length,
            };
            let id = state.ledger.add_item(draft)?;
            println!("✔ 已新增项目 [{}]", id);
            persist(&state);
            print_totals(&state);
        }

        Commands::Edit { id, name, price, quantity, unit, length } => {
            let edit = ItemEdit {
                name,
                unit,
                unit_price: price,
                quantity,
                is_length_unit: length,
            };
            state.ledger.edit_item(id, edit)?;
            println!("✔ 已修改项目 [{}]", id);
            persist(&state);
            print_totals(&state);
        }

        Commands::Delete { id } => {
            let removed = state.ledger.delete_item(id)?;
            println!("✔ 已删除: {}（其余项目已重新编号）", removed.name);
            persist(&state);
            print_totals(&state);
        }

        Commands::Qty { id, value } => {
            let item = state.ledger.get(id)?;
            let value = match value {
                Some(value) => value,
                None => Input::<f64>::new()
                    .with_prompt(format!("[{}] {} 的工程量（{}）", id, item.name, item.display_unit()))
                    .default(item.quantity)
                    .interact_text()
                    .map_err(|e| BudgetError::Cli(e.to_string()))?,
            };
            state.ledger.set_quantity(id, value)?;
            println!("✔ 工程量已更新: [{}] {:.2}", id, value);
            persist(&state);
            print_totals(&state);
        }

        Commands::Worklist => {
            println!("{}", format_work_list(state.ledger.items()));
            print_totals(&state);
        }

        Commands::Info { set } => {
            if !set.is_empty() {
                for entry in &set {
                    let (key, value) = cli::parse_key_value(entry)
                        .ok_or_else(|| BudgetError::Cli(format!("格式应为 键=值: {}", entry)))?;
                    let key = BaseInfoKey::from_label(key).ok_or_else(|| {
                        let known: Vec<&str> = BaseInfoKey::ALL.iter().map(|k| k.as_str()).collect();
                        BudgetError::Cli(format!("未知的基础信息项: {}（可用: {}）", key, known.join("、")))
                    })?;
                    state.base_info.set(key, value);
                }
                match state.save_base_info() {
                    Ok(()) => println!("✔ 基础信息已保存"),
                    Err(e) => println!("⚠ {}", e),
                }
            }
            println!("基础信息:");
            for (key, value) in state.base_info.iter() {
                println!("  {}: {}", key, if value.is_empty() { "(未填写)" } else { value });
            }
        }

        Commands::Export { output } => {
            println!("📄 budget-docgen - 预算清单导出\n");
            let output = output.unwrap_or_else(|| PathBuf::from("."));
            let stamp = session::date_stamp(session::today());
            let (path, rows) = export::export_budget(&state.ledger, &output, &stamp)?;
            println!("✔ Excel输出: {} ({}行)", path.display(), rows);
            println!("\n✅ 导出完成");
        }

        Commands::Generate {
            app_template,
            review_template,
            image,
            image_dir,
            project_name,
            date,
            cycle,
            output_dir,
        } => {
            println!("📝 budget-docgen - 文档生成\n");

            let app_template = app_template.or_else(|| state.config.application_template.clone());
            let review_template = review_template.or_else(|| state.config.review_template.clone());
            let date = date
                .map(|d| {
                    session::parse_date(&d)
                        .ok_or_else(|| BudgetError::Cli(format!("日期格式无效: {}", d)))
                })
                .transpose()?;
            let project = state.project_info(project_name, date, cycle);
            let stamp = session::date_stamp(date.unwrap_or_else(session::today));
            let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));

            println!("[1/2] 收集支撑文件图片...");
            let selection =
                scanner::collect_images(&image, image_dir.as_deref(), state.config.max_images)?;
            for warning in selection.warnings() {
                println!("⚠ {}", warning);
            }
            println!("✔ {}张图片\n", selection.images.len());

            let totals = state.ledger.recompute_totals();
            println!("[2/2] 生成文档... (项目: {}, 总金额: {:.2}元)", project.name, totals.grand_total);
            let request = projector::GenerateRequest {
                application_template: app_template.as_deref(),
                review_template: review_template.as_deref(),
                output_dir: &output_dir,
                ledger: &state.ledger,
                base_info: &state.base_info,
                project: &project,
                images: &selection.images,
                picture: projector::PictureOptions {
                    max_width_in: state.config.image_max_width_in,
                    max_height_in: state.config.image_max_height_in,
                },
                date_stamp: &stamp,
            };
            let outcome = projector::generate_documents(&request)?;

            for (title, result) in [("申请表", &outcome.application), ("会审单", &outcome.review)] {
                match result {
                    Ok(report) => {
                        println!("✔ {}: {}", report.title, report.output.display());
                        for warning in &report.fill.warnings {
                            println!("  ⚠ {}", warning);
                        }
                        if report.fill.images_embedded + report.fill.images_skipped > 0 {
                            println!(
                                "  图片: 插入{}张，失败{}张",
                                report.fill.images_embedded, report.fill.images_skipped
                            );
                        }
                    }
                    Err(e) => println!("✘ {}生成失败: {}", title, e),
                }
            }

            if outcome.all_succeeded() {
                println!("\n✅ 生成成功！金额：{:.2}元", totals.grand_total);
            } else {
                return Err(BudgetError::Cli("部分文档生成失败".into()));
            }
        }

        Commands::Config { .. } => {}
    }
    Ok(())
}

fn configure(mut config: Config, command: Commands) -> Result<()> {
    let Commands::Config {
        set_app_template,
        set_review_template,
        quantity_source,
        data_dir,
        reset_quantities_on_load,
        show,
    } = command
    else {
        return Ok(());
    };

    let mut changed = false;
    if let Some(path) = set_app_template {
        if !path.exists() {
            return Err(BudgetError::FileNotFound(path.display().to_string()));
        }
        config.application_template = Some(path);
        changed = true;
    }
    if let Some(path) = set_review_template {
        if !path.exists() {
            return Err(BudgetError::FileNotFound(path.display().to_string()));
        }
        config.review_template = Some(path);
        changed = true;
    }
    if let Some(source) = quantity_source {
        config.quantity_source = source;
        changed = true;
    }
    if let Some(dir) = data_dir {
        config.data_dir = dir;
        changed = true;
    }
    if let Some(reset) = reset_quantities_on_load {
        config.reset_quantities_on_load = reset;
        changed = true;
    }
    if changed {
        config.save()?;
        println!("✔ 设置已保存");
    }
    if show || !changed {
        print_config(&config);
    }
    Ok(())
}

/// 保存失败只提示，不影响命令结果
fn persist(state: &AppState) {
    if let Err(e) = state.save_ledger() {
        println!("⚠ {}（内存中的修改未保存）", e);
    }
}

fn print_items(items: &[&LineItem]) {
    println!(
        "{:>4}  {:<8} {:<36} {:>10} {:>12} {:>12}",
        "ID", "类别", "项目名称", "单价", "工程量", "合计"
    );
    for item in items {
        println!(
            "{:>4}  {:<8} {:<36} {:>10.2} {:>8.2} {:<4} {:>11.2}",
            item.id,
            item.category.label(),
            item.name,
            item.unit_price,
            item.quantity,
            item.display_unit(),
            item.total()
        );
    }
}

fn print_totals(state: &AppState) {
    let totals = state.ledger.recompute_totals();
    println!(
        "\n总金额: {:.2}元（施工 {:.2} / 材料 {:.2}，有效项目{}个）",
        totals.grand_total, totals.construction_total, totals.material_total, totals.billable_count
    );
}

fn print_config(config: &Config) {
    let path_or_unset = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "未设置".into())
    };
    println!("设置:");
    println!("  数据目录: {}", config.data_dir.display());
    println!("  工程量来源: {}", config.quantity_source);
    println!("  读取时工程量清零: {}", config.reset_quantities_on_load);
    println!("  申请表模板: {}", path_or_unset(&config.application_template));
    println!("  会审单模板: {}", path_or_unset(&config.review_template));
    println!("  图片上限: {}张", config.max_images);
    println!(
        "  图片尺寸: {}in × {}in",
        config.image_max_width_in, config.image_max_height_in
    );
    println!("  默认项目名称: {}", config.default_project_name);
    println!("  默认实施周期: {}", config.default_cycle);
}
