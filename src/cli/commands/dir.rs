//! `tender dir` command - Employees, organizations and responsibilities

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::PageArgs;
use crate::cli::output::{print_changed, print_list};
use crate::cli::Context;
use crate::core::store::SqlDirectory;
use crate::entities::directory::OrganizationType;

#[derive(Subcommand, Debug)]
pub enum DirCommands {
    /// Register an employee
    EmployeeAdd(EmployeeAddArgs),

    /// Register an organization
    OrgAdd(OrgAddArgs),

    /// Make an employee responsible for an organization
    ResponsibleAdd(ResponsibleArgs),

    /// Remove an employee's responsibility for an organization
    ResponsibleRemove(ResponsibleArgs),

    /// List employees
    Employees(PageArgs),

    /// List organizations
    Orgs(PageArgs),

    /// List the responsibles of an organization
    Responsibles(ResponsiblesArgs),
}

#[derive(clap::Args, Debug)]
pub struct EmployeeAddArgs {
    /// Unique login name
    pub username: String,

    #[arg(long, default_value = "")]
    pub first_name: String,

    #[arg(long, default_value = "")]
    pub last_name: String,
}

#[derive(clap::Args, Debug)]
pub struct OrgAddArgs {
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Legal form: IE, LLC or JSC
    #[arg(long = "type", default_value = "LLC")]
    pub org_type: OrganizationType,
}

#[derive(clap::Args, Debug)]
pub struct ResponsibleArgs {
    /// Organization id
    #[arg(long)]
    pub org: String,

    /// Employee username
    #[arg(long, short = 'u')]
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct ResponsiblesArgs {
    /// Organization id
    #[arg(long)]
    pub org: String,
}

pub fn run(cmd: DirCommands, ctx: &Context) -> Result<()> {
    match cmd {
        DirCommands::EmployeeAdd(args) => run_employee_add(args, ctx),
        DirCommands::OrgAdd(args) => run_org_add(args, ctx),
        DirCommands::ResponsibleAdd(args) => run_responsible_add(args, ctx),
        DirCommands::ResponsibleRemove(args) => run_responsible_remove(args, ctx),
        DirCommands::Employees(args) => run_employees(args, ctx),
        DirCommands::Orgs(args) => run_orgs(args, ctx),
        DirCommands::Responsibles(args) => run_responsibles(args, ctx),
    }
}

fn run_employee_add(args: EmployeeAddArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let employee = store.write(|conn| {
        SqlDirectory::new(conn).add_employee(&args.username, &args.first_name, &args.last_name)
    })?;
    print_changed("Added", "employee", &employee, &employee.username, &ctx.global)
}

fn run_org_add(args: OrgAddArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let organization = store.write(|conn| {
        SqlDirectory::new(conn).add_organization(&args.name, &args.description, args.org_type)
    })?;
    print_changed("Added", "organization", &organization, &organization.name, &ctx.global)
}

fn run_responsible_add(args: ResponsibleArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    store.write(|conn| SqlDirectory::new(conn).add_responsible(&args.org, &args.username))?;

    println!(
        "{} {} is responsible for {}",
        style("✓").green(),
        style(&args.username).yellow(),
        style(&args.org).cyan()
    );
    Ok(())
}

fn run_responsible_remove(args: ResponsibleArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let removed =
        store.write(|conn| SqlDirectory::new(conn).remove_responsible(&args.org, &args.username))?;

    if removed {
        println!(
            "{} {} is no longer responsible for {}",
            style("✓").green(),
            style(&args.username).yellow(),
            style(&args.org).cyan()
        );
    } else {
        println!(
            "{} {} was not responsible for {}",
            style("!").yellow(),
            args.username,
            args.org
        );
    }
    Ok(())
}

fn run_employees(args: PageArgs, ctx: &Context) -> Result<()> {
    let page = ctx.page(&args)?;
    let store = ctx.open_store()?;
    let employees = store.read(|conn| SqlDirectory::new(conn).employees(page))?;
    print_list(&employees, "employees", &ctx.global)
}

fn run_orgs(args: PageArgs, ctx: &Context) -> Result<()> {
    let page = ctx.page(&args)?;
    let store = ctx.open_store()?;
    let organizations = store.read(|conn| SqlDirectory::new(conn).organizations(page))?;
    print_list(&organizations, "organizations", &ctx.global)
}

fn run_responsibles(args: ResponsiblesArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let employees = store.read(|conn| SqlDirectory::new(conn).responsibles(&args.org))?;
    print_list(&employees, "responsibles", &ctx.global)
}
