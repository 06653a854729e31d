//! `tender bids` command - Bid management, decisions and feedback

use clap::Subcommand;
use miette::Result;

use crate::cli::args::PageArgs;
use crate::cli::helpers::non_empty;
use crate::cli::output::{print_changed, print_list, print_value};
use crate::cli::Context;
use crate::core::bids::{BidWorkflow, NewBid};
use crate::core::entity::{AuthorType, BidStatus, Decision};
use crate::entities::bid::BidPatch;

#[derive(Subcommand, Debug)]
pub enum BidCommands {
    /// Submit a bid against a published tender
    New(NewArgs),

    /// Edit name or description (writes a new version)
    Edit(EditArgs),

    /// Show a bid's status
    Status(UserArgs),

    /// Change a bid's status
    SetStatus(SetStatusArgs),

    /// Make an earlier version current again
    Rollback(RollbackArgs),

    /// Approve or reject a bid
    Decide(DecideArgs),

    /// Leave feedback for a bid's author
    Feedback(FeedbackArgs),

    /// Reviews a bid author has received
    Reviews(ReviewsArgs),

    /// List the bids on a tender
    List(ListArgs),

    /// List your bids and those of organizations you are responsible for
    My(MyArgs),

    /// Show every version of a bid
    History(UserArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: String,

    /// Tender id
    #[arg(long)]
    pub tender: String,

    /// Organization or User
    #[arg(long, default_value = "User")]
    pub author_type: AuthorType,

    /// Employee id for User bids, organization id for Organization bids
    #[arg(long)]
    pub author_id: String,
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
}

#[derive(clap::Args, Debug)]
pub struct UserArgs {
    pub id: String,

    #[arg(long, short = 'u')]
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct SetStatusArgs {
    pub id: String,

    /// Created, Published or Canceled
    pub status: BidStatus,

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
pub struct DecideArgs {
    pub id: String,

    /// Approved or Rejected
    pub decision: Decision,

    #[arg(long, short = 'u')]
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct FeedbackArgs {
    pub id: String,

    #[arg(long, short = 'u')]
    pub username: String,

    #[arg(long)]
    pub feedback: String,
}

#[derive(clap::Args, Debug)]
pub struct ReviewsArgs {
    /// Tender the requester is responsible for
    #[arg(long)]
    pub tender: String,

    /// Username of the bid author whose reviews to list
    #[arg(long)]
    pub author: String,

    /// Username of the responsible asking
    #[arg(long)]
    pub requester: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Tender id
    #[arg(long)]
    pub tender: String,

    #[arg(long, short = 'u')]
    pub username: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct MyArgs {
    #[arg(long, short = 'u')]
    pub username: String,

    #[command(flatten)]
    pub page: PageArgs,
}

pub fn run(cmd: BidCommands, ctx: &Context) -> Result<()> {
    match cmd {
        BidCommands::New(args) => run_new(args, ctx),
        BidCommands::Edit(args) => run_edit(args, ctx),
        BidCommands::Status(args) => run_status(args, ctx),
        BidCommands::SetStatus(args) => run_set_status(args, ctx),
        BidCommands::Rollback(args) => run_rollback(args, ctx),
        BidCommands::Decide(args) => run_decide(args, ctx),
        BidCommands::Feedback(args) => run_feedback(args, ctx),
        BidCommands::Reviews(args) => run_reviews(args, ctx),
        BidCommands::List(args) => run_list(args, ctx),
        BidCommands::My(args) => run_my(args, ctx),
        BidCommands::History(args) => run_history(args, ctx),
    }
}

fn run_new(args: NewArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let bid = BidWorkflow::new(&store).create(&NewBid {
        name: args.name,
        description: args.description,
        tender_id: args.tender,
        author_type: args.author_type,
        author_id: args.author_id,
    })?;
    print_changed("Created", "bid", &bid, &bid.name, &ctx.global)
}

fn run_edit(args: EditArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let patch = BidPatch {
        name: non_empty(args.name),
        description: non_empty(args.description),
    };
    let bid = BidWorkflow::new(&store).edit(&args.id, &args.username, &patch)?;
    let detail = format!("version {}", bid.version);
    print_changed("Edited", "bid", &bid, &detail, &ctx.global)
}

fn run_status(args: UserArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let status = BidWorkflow::new(&store).status(&args.id, &args.username)?;
    print_value(&status, &ctx.global)
}

fn run_set_status(args: SetStatusArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let bid = BidWorkflow::new(&store).set_status(&args.id, args.status, &args.username)?;
    let detail = format!("status {}", bid.status);
    print_changed("Updated", "bid", &bid, &detail, &ctx.global)
}

fn run_rollback(args: RollbackArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let bid = BidWorkflow::new(&store).rollback(&args.id, args.target, &args.username)?;
    let detail = format!("version {} restored as {}", args.target, bid.version);
    print_changed("Rolled back", "bid", &bid, &detail, &ctx.global)
}

fn run_decide(args: DecideArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let bid = BidWorkflow::new(&store).submit_decision(&args.id, args.decision, &args.username)?;
    let detail = match bid.decision {
        Some(decision) => format!("decision {}", decision),
        None => "approve recorded, quorum not reached yet".to_string(),
    };
    print_changed("Voted on", "bid", &bid, &detail, &ctx.global)
}

fn run_feedback(args: FeedbackArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let bid = BidWorkflow::new(&store).submit_feedback(&args.id, &args.username, &args.feedback)?;
    print_changed("Left feedback on", "bid", &bid, &bid.name, &ctx.global)
}

fn run_reviews(args: ReviewsArgs, ctx: &Context) -> Result<()> {
    let page = ctx.page(&args.page)?;
    let store = ctx.open_store()?;
    let reviews = BidWorkflow::new(&store).reviews_on_author_bids(
        &args.tender,
        &args.author,
        &args.requester,
        page,
    )?;
    print_list(&reviews, "reviews", &ctx.global)
}

fn run_list(args: ListArgs, ctx: &Context) -> Result<()> {
    let page = ctx.page(&args.page)?;
    let store = ctx.open_store()?;
    let bids = BidWorkflow::new(&store).tender_bids(&args.tender, &args.username, page)?;
    print_list(&bids, "bids", &ctx.global)
}

fn run_my(args: MyArgs, ctx: &Context) -> Result<()> {
    let page = ctx.page(&args.page)?;
    let store = ctx.open_store()?;
    let bids = BidWorkflow::new(&store).user_bids(&args.username, page)?;
    print_list(&bids, "bids", &ctx.global)
}

fn run_history(args: UserArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let versions = BidWorkflow::new(&store).history(&args.id, &args.username)?;
    print_list(&versions, "versions", &ctx.global)
}
