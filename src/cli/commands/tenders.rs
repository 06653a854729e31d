//! `tender tenders` command - Tender management

use clap::Subcommand;
use miette::Result;

use crate::cli::args::PageArgs;
use crate::cli::helpers::non_empty;
use crate::cli::output::{print_changed, print_list, print_value};
use crate::cli::Context;
use crate::core::entity::{ServiceType, TenderStatus};
use crate::core::tenders::{NewTender, TenderWorkflow};
use crate::entities::tender::TenderPatch;

#[derive(Subcommand, Debug)]
pub enum TenderCommands {
    /// Create a tender for an organization
    New(NewArgs),

    /// Edit name, description or service type (writes a new version)
    Edit(EditArgs),

    /// Show a tender's status
    Status(StatusArgs),

    /// Change a tender's status
    SetStatus(SetStatusArgs),

    /// Make an earlier version current again
    Rollback(RollbackArgs),

    /// List published tenders
    List(ListArgs),

    /// List the tenders of your organization
    My(MyArgs),

    /// Show every version of a tender
    History(HistoryArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: String,

    /// Construction, Delivery or Manufacture
    #[arg(long)]
    pub service_type: ServiceType,

    /// Owning organization id
    #[arg(long)]
    pub org: String,

    /// Creator; must be responsible for the organization
    #[arg(long, short = 'u')]
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(long, short = 'u')]
    pub username: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub service_type: Option<ServiceType>,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    pub id: String,

    /// Needed unless the tender is published
    #[arg(long, short = 'u')]
    pub username: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetStatusArgs {
    pub id: String,

    /// Created, Published or Closed
    pub status: TenderStatus,

    #[arg(long, short = 'u')]
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct RollbackArgs {
    pub id: String,

    /// Version whose fields become current
    #[arg(value_name = "VERSION")]
    pub target: u32,

    #[arg(long, short = 'u')]
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only these service types (comma separated)
    #[arg(long, short = 's', value_delimiter = ',')]
    pub service_type: Vec<ServiceType>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct MyArgs {
    /// Without a username this lists published tenders
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    pub id: String,

    #[arg(long, short = 'u')]
    pub username: String,
}

pub fn run(cmd: TenderCommands, ctx: &Context) -> Result<()> {
    match cmd {
        TenderCommands::New(args) => run_new(args, ctx),
        TenderCommands::Edit(args) => run_edit(args, ctx),
        TenderCommands::Status(args) => run_status(args, ctx),
        TenderCommands::SetStatus(args) => run_set_status(args, ctx),
        TenderCommands::Rollback(args) => run_rollback(args, ctx),
        TenderCommands::List(args) => run_list(args, ctx),
        TenderCommands::My(args) => run_my(args, ctx),
        TenderCommands::History(args) => run_history(args, ctx),
    }
}

fn run_new(args: NewArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let tender = TenderWorkflow::new(&store).create(&NewTender {
        name: args.name,
        description: args.description,
        service_type: args.service_type,
        organization_id: args.org,
        creator_username: args.username,
    })?;
    print_changed("Created", "tender", &tender, &tender.name, &ctx.global)
}

fn run_edit(args: EditArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let patch = TenderPatch {
        name: non_empty(args.name),
        description: non_empty(args.description),
        service_type: args.service_type,
    };
    let tender = TenderWorkflow::new(&store).edit(&args.id, &args.username, &patch)?;
    let detail = format!("version {}", tender.version);
    print_changed("Edited", "tender", &tender, &detail, &ctx.global)
}

fn run_status(args: StatusArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let status = TenderWorkflow::new(&store).status(&args.id, args.username.as_deref())?;
    print_value(&status, &ctx.global)
}

fn run_set_status(args: SetStatusArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let tender = TenderWorkflow::new(&store).set_status(&args.id, args.status, &args.username)?;
    let detail = format!("status {}", tender.status);
    print_changed("Updated", "tender", &tender, &detail, &ctx.global)
}

fn run_rollback(args: RollbackArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let tender = TenderWorkflow::new(&store).rollback(&args.id, args.target, &args.username)?;
    let detail = format!("version {} restored as {}", args.target, tender.version);
    print_changed("Rolled back", "tender", &tender, &detail, &ctx.global)
}

fn run_list(args: ListArgs, ctx: &Context) -> Result<()> {
    let page = ctx.page(&args.page)?;
    let store = ctx.open_store()?;
    let tenders = TenderWorkflow::new(&store).published(&args.service_type, page)?;
    print_list(&tenders, "tenders", &ctx.global)
}

fn run_my(args: MyArgs, ctx: &Context) -> Result<()> {
    let page = ctx.page(&args.page)?;
    let store = ctx.open_store()?;
    let tenders = TenderWorkflow::new(&store).user_tenders(args.username.as_deref(), page)?;
    print_list(&tenders, "tenders", &ctx.global)
}

fn run_history(args: HistoryArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let versions = TenderWorkflow::new(&store).history(&args.id, &args.username)?;
    print_list(&versions, "versions", &ctx.global)
}
