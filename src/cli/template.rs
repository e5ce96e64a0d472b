use anyhow::Result;
use clap::Subcommand;
use plateplan::config::Config;
use time::Date;

use super::{PlanView, ensure_can_edit, parse_date, print_json};

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// Save a plan as a reusable template
    Save {
        plan_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        user: String,
    },
    /// Slot coverage of a template
    Stats { id: String },
    /// Create a new plan from a template
    Apply {
        id: String,
        #[arg(long, value_parser = parse_date)]
        start: Date,
        #[arg(long)]
        user: String,
    },
}

#[tracing::instrument(skip(config, command))]
pub async fn run(config: Config, command: TemplateCommand) -> Result<()> {
    let service = super::service(&config).await?;
    let today = service.today();

    match command {
        TemplateCommand::Save {
            plan_id,
            name,
            description,
            user,
        } => {
            let plan = service.find(&plan_id).await?;
            ensure_can_edit(&config, &user, &plan.family_id)?;

            let template = service.save_as_template(&plan, name, description).await?;

            print_json(&PlanView::new(&template, today)?)
        }
        TemplateCommand::Stats { id } => {
            let template = service.find(&id).await?;

            print_json(&service.get_template_stats(&template)?)
        }
        TemplateCommand::Apply { id, start, user } => {
            let template = service.find(&id).await?;
            ensure_can_edit(&config, &user, &template.family_id)?;

            let plan = service.apply_template(&template, start, user).await?;

            print_json(&PlanView::new(&plan, today)?)
        }
    }
}
