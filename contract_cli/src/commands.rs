use std::path::Path;

use anyhow::Context;
use contract_core::errors::{ContractError, ContractResult};
use contract_core::money::{format_money, format_with_currency};
use contract_core::offer::Offer;
use contract_core::planning::{rollup_cost, CostRollup, ProjectPhase, ProjectPlan, ProjectTask, TaskResource};
use contract_core::pricing::{calculate_price, LineItemEdit, PriceInput};
use contract_core::rates::{FallbackPolicy, RateSource, RestRateSource};
use contract_core::session::Session;
use contract_core::workspace::Workspace;
use contract_core::{load_workspace, save_workspace};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{Command, OfferCommand, PlanCommand};

pub(crate) async fn run(command: Command, session: &Session, json: bool) -> anyhow::Result<()> {
    match command {
        Command::Init { workspace, empty } => init(&workspace, empty),
        Command::Quote {
            workspace,
            license,
            users,
            annual,
            discount,
            margin,
        } => {
            let ws = load_workspace(&workspace)?;
            let input = PriceInput {
                users,
                annual_commitment: annual,
                discount_pct: discount,
                margin_pct: margin.unwrap_or(session.settings.pricing.margin_pct),
            };
            let price = calculate_price(ws.license_type(&license), &input);
            if json {
                print_json(&serde_json::json!({ "license": license, "input": input, "price": price }))
            } else {
                match price {
                    Some(value) => println!("{}", format_with_currency(value, &session.settings.pricing.currency)),
                    None => println!("No price (unknown license, no users, or no list price)"),
                }
                Ok(())
            }
        }
        Command::Offer(cmd) => offer(cmd, session, json),
        Command::Convert { workspace, offer } => {
            let mut ws = load_workspace(&workspace)?;
            let plan = ProjectPlan::from_offer(ws.get_offer(&offer)?, session)?;
            let id = ws.upsert_project(plan);
            save_workspace(&ws, &workspace)?;
            info!("Converted offer {} into project {}", offer, id);
            show_plan(ws.get_project(&id)?, json)
        }
        Command::Plan(cmd) => plan(cmd, session, json).await,
        Command::Rollup {
            workspace,
            project,
            strict,
        } => rollup(&workspace, project, strict, session, json).await,
    }
}

fn init(path: &Path, empty: bool) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let ws = if empty {
        Workspace::new()
    } else {
        Workspace::with_default_catalog()
    };
    save_workspace(&ws, path)?;
    println!("Created {}", path.display());
    Ok(())
}

fn offer(cmd: OfferCommand, session: &Session, json: bool) -> anyhow::Result<()> {
    match cmd {
        OfferCommand::New {
            workspace,
            customer,
            solution,
            notes,
        } => {
            let mut ws = load_workspace(&workspace)?;
            let mut offer = Offer::new(customer, solution, session);
            offer.notes = notes;
            offer.validate()?;
            let id = ws.upsert_offer(offer);
            save_workspace(&ws, &workspace)?;
            show_offer(ws.get_offer(&id)?, session, json)
        }
        OfferCommand::AddItem {
            workspace,
            offer,
            license,
            quantity,
            unit_price,
            discount,
            annual,
            monthly,
        } => {
            let mut ws = load_workspace(&workspace)?;
            let license_type = ws
                .license_type(&license)
                .cloned()
                .ok_or_else(|| ContractError::not_found("License type", &license))?;

            let mut current = ws.get_offer(&offer)?.clone();
            let mut form = current.form();
            let item = form.add_item(Some(&license_type));
            let mut edits = vec![
                LineItemEdit::Quantity(quantity),
                LineItemEdit::DiscountPct(discount),
                LineItemEdit::AnnualCommitment(annual),
                LineItemEdit::MonthlyPayment(monthly),
            ];
            if let Some(price) = unit_price {
                edits.push(LineItemEdit::UnitPrice(price));
            }
            for edit in edits {
                form.apply(item, edit);
            }
            if let Some(row) = form.item(item) {
                row.validate()?;
            }
            current.apply_form(form);

            ws.upsert_offer(current);
            save_workspace(&ws, &workspace)?;
            show_offer(ws.get_offer(&offer)?, session, json)
        }
        OfferCommand::RemoveItem { workspace, offer, item } => {
            update_offer(&workspace, offer, session, json, |o, _| {
                let mut form = o.form();
                form.remove_item(item)
                    .ok_or_else(|| ContractError::not_found("Line item", item))?;
                o.apply_form(form);
                Ok(())
            })
        }
        OfferCommand::Submit { workspace, offer } => {
            update_offer(&workspace, offer, session, json, |o, s| o.submit(s))
        }
        OfferCommand::Approve { workspace, offer } => {
            update_offer(&workspace, offer, session, json, |o, s| o.approve(s))
        }
        OfferCommand::Reject { workspace, offer } => {
            update_offer(&workspace, offer, session, json, |o, s| o.reject(s))
        }
        OfferCommand::Reopen { workspace, offer } => {
            update_offer(&workspace, offer, session, json, |o, s| o.reopen(s))
        }
        OfferCommand::Show { workspace, offer } => {
            let ws = load_workspace(&workspace)?;
            show_offer(ws.get_offer(&offer)?, session, json)
        }
    }
}

fn update_offer<F>(path: &Path, id: Uuid, session: &Session, json: bool, change: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut Offer, &Session) -> ContractResult<()>,
{
    let mut ws = load_workspace(path)?;
    let mut offer = ws.get_offer(&id)?.clone();
    change(&mut offer, session)?;
    ws.upsert_offer(offer);
    save_workspace(&ws, path)?;
    show_offer(ws.get_offer(&id)?, session, json)
}

async fn plan(cmd: PlanCommand, session: &Session, json: bool) -> anyhow::Result<()> {
    match cmd {
        PlanCommand::AddTask {
            workspace,
            project,
            phase,
            name,
            days,
        } => {
            let task = ProjectTask::new(name, days);
            task.validate()?;
            update_plan(&workspace, project, session, json, |plan| {
                let phase_id = phase_id(plan, &phase)?;
                plan.add_task(&phase_id, task)?;
                Ok(())
            })
            .await
        }
        PlanCommand::AddResource {
            workspace,
            project,
            phase,
            task,
            code,
            days,
        } => {
            let ws = load_workspace(&workspace)?;
            let resource_type = ws
                .resource_type(&code)
                .ok_or_else(|| ContractError::not_found("Resource type", &code))?;
            let resource = TaskResource::new(resource_type.code, resource_type.name, days);
            resource.validate()?;
            update_plan(&workspace, project, session, json, |plan| {
                let phase_id = phase_id(plan, &phase)?;
                let task_id = task_id(plan, &phase_id, &task)?;
                if !plan.add_resource(&phase_id, &task_id, resource)? {
                    println!("{} is already assigned to '{}'", code, task);
                }
                Ok(())
            })
            .await
        }
        PlanCommand::SetDays {
            workspace,
            project,
            phase,
            days,
        } => {
            update_plan(&workspace, project, session, json, |plan| {
                let phase_id = phase_id(plan, &phase)?;
                plan.set_phase_days(&phase_id, days)
            })
            .await
        }
        PlanCommand::Show { workspace, project } => {
            let ws = load_workspace(&workspace)?;
            show_plan(ws.get_project(&project)?, json)
        }
    }
}

/// Load, edit, re-cost and save a plan. Rate fetch failures cost at zero.
async fn update_plan<F>(path: &Path, id: Uuid, session: &Session, json: bool, change: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut ProjectPlan) -> ContractResult<()>,
{
    let mut ws = load_workspace(path)?;
    let mut plan = ws.get_project(&id)?.clone();
    change(&mut plan)?;
    plan.validate()?;

    let rollup = rollup_plan(&plan, &ws, session, FallbackPolicy::ZeroCost).await?;
    plan.apply_rollup(&rollup);

    ws.upsert_project(plan);
    save_workspace(&ws, path)?;
    show_plan(ws.get_project(&id)?, json)
}

fn phase_id(plan: &ProjectPlan, name: &str) -> ContractResult<Uuid> {
    plan.phase_by_name(name)
        .map(|p| p.id)
        .ok_or_else(|| ContractError::not_found("Phase", name))
}

fn task_id(plan: &ProjectPlan, phase_id: &Uuid, name: &str) -> ContractResult<Uuid> {
    plan.phase(phase_id)
        .and_then(|p| p.tasks.iter().find(|t| t.name == name))
        .map(|t| t.id)
        .ok_or_else(|| ContractError::not_found("Task", name))
}

async fn rollup(path: &Path, project: Uuid, strict: bool, session: &Session, json: bool) -> anyhow::Result<()> {
    let mut ws = load_workspace(path)?;
    let plan = ws.get_project(&project)?.clone();

    let policy = if strict {
        FallbackPolicy::Propagate
    } else {
        FallbackPolicy::ZeroCost
    };

    let rollup = rollup_plan(&plan, &ws, session, policy).await?;

    let mut plan = plan;
    plan.apply_rollup(&rollup);
    ws.upsert_project(plan);
    save_workspace(&ws, path).context("saving rollup")?;

    if json {
        print_json(&rollup)
    } else {
        println!("Total days:     {}", rollup.total_days);
        println!(
            "Total cost:     {}",
            format_with_currency(rollup.total_cost, &session.settings.pricing.currency)
        );
        println!("Resources:      {}", rollup.resource_count);
        println!("Rates found:    {}", rollup.rates_found);
        Ok(())
    }
}

/// Cost a plan against the REST store when one is configured, otherwise
/// against the workspace's own rates.
async fn rollup_plan(
    plan: &ProjectPlan,
    ws: &Workspace,
    session: &Session,
    policy: FallbackPolicy,
) -> ContractResult<CostRollup> {
    let rest = RestRateSource::from_settings(&session.settings.store);
    let source: &dyn RateSource = match &rest {
        Some(rest) => {
            info!("Fetching rates for '{}' from REST store", plan.solution_id);
            rest
        }
        None => ws,
    };
    Ok(rollup_cost(plan, source, policy).await?)
}

fn show_offer(offer: &Offer, session: &Session, json: bool) -> anyhow::Result<()> {
    let totals = offer.totals();
    if json {
        return print_json(&serde_json::json!({ "offer": offer, "totals": totals }));
    }

    let currency = &session.settings.pricing.currency;
    println!("Offer {} ({})", offer.id, offer.status.as_str());
    println!("  Customer: {}", offer.customer_name);
    println!("  Solution: {}", offer.solution_id);
    println!();
    for item in &offer.line_items {
        println!(
            "  #{:<3} {:<14} x{:<4} @ {:>10} {:>5}% off {:<7} = {:>12}  (margin {})",
            item.id,
            item.license_type_id.as_deref().unwrap_or("-"),
            item.quantity,
            format_money(item.unit_price),
            item.discount_pct,
            if item.annual_commitment { "annual" } else { "monthly" },
            format_money(item.total_value),
            format_money(item.margin_value),
        );
    }
    let display = totals.display();
    println!();
    println!("  Total value:    {} {}", display.total_value, currency);
    println!("  Total discount: {} {}", display.total_discount, currency);
    println!("  Final total:    {} {}", display.final_total, currency);
    println!("  Total margin:   {} {}", display.total_margin, currency);
    Ok(())
}

fn show_plan(plan: &ProjectPlan, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(plan);
    }

    println!("Project {} ({})", plan.id, plan.status);
    println!("  Name:     {}", plan.name);
    println!("  Solution: {}", plan.solution_id);
    println!();
    for phase in &plan.phases {
        print_phase(phase, &plan.manual_days_phase);
    }
    println!();
    println!("  Total days: {}   Resources: {}", plan.total_days(), plan.resource_count());
    println!("  Last rollup cost: {}", format_money(plan.total_cost));
    Ok(())
}

fn print_phase(phase: &ProjectPhase, manual_phase: &str) {
    let marker = if phase.name == manual_phase { " (manual)" } else { "" };
    println!("  {} - {} days{}", phase.name, phase.days, marker);
    for task in &phase.tasks {
        println!("    {} - {} days", task.name, task.days);
        for resource in &task.resources {
            println!("      {} {} - {} days", resource.code, resource.name, resource.days);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
