use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client_core::{filter_employees, view, DirectoryClient};
use shared::{domain::EmployeeId, protocol::EmployeeDraft};

#[derive(Parser, Debug)]
#[command(name = "employee-dir", about = "Command-line employee directory client")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the directory and print it as a table.
    List,
    /// Print one employee by id.
    Show { id: i64 },
    /// Filter the fetched directory by name or email substring.
    Search { query: String },
    /// Create an employee.
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        salary: Option<f64>,
        #[arg(long)]
        date_hired: Option<NaiveDate>,
    },
    /// Update fields on an existing employee; omitted flags are left untouched.
    Edit {
        id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        salary: Option<f64>,
        #[arg(long)]
        date_hired: Option<NaiveDate>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete an employee. Prompts for confirmation unless --yes is given.
    Remove {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

fn print_table(table: &view::TableView) {
    if table.empty {
        println!("{}", view::NO_EMPLOYEES_PLACEHOLDER);
        return;
    }
    println!(
        "{:>5}  {:<24}  {:<28}  {:<16}  {:<16}",
        "ID", "NAME", "EMAIL", "DEPARTMENT", "TITLE"
    );
    for row in &table.rows {
        println!(
            "{:>5}  {:<24}  {:<28}  {:<16}  {:<16}",
            row.id, row.name, row.email, row.department, row.title
        );
    }
    println!("{}", table.count_label);
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    tracing::debug!(server_url = %args.server_url, "using directory server");
    let client = DirectoryClient::new(args.server_url);

    match args.command {
        Command::List => {
            let employees = client.refresh().await?;
            print_table(&view::build_table(&employees));
        }
        Command::Show { id } => {
            let employee = client.fetch_employee(EmployeeId(id)).await?;
            println!("#{} {}", employee.id.0, employee.full_name());
            println!("  email:      {}", employee.email);
            if let Some(phone) = &employee.phone {
                println!("  phone:      {phone}");
            }
            if let Some(department) = &employee.department {
                println!("  department: {department}");
            }
            if let Some(title) = &employee.title {
                println!("  title:      {title}");
            }
            if let Some(salary) = employee.salary {
                println!("  salary:     {salary}");
            }
            if let Some(date_hired) = employee.date_hired {
                println!("  hired:      {date_hired}");
            }
            println!("  active:     {}", employee.is_active);
        }
        Command::Search { query } => {
            let employees = client.refresh().await?;
            let matched = filter_employees(&employees, &query);
            print_table(&view::build_table(&matched));
        }
        Command::Add {
            first_name,
            last_name,
            email,
            phone,
            department,
            title,
            salary,
            date_hired,
        } => {
            let draft = EmployeeDraft {
                first_name: Some(first_name),
                last_name: Some(last_name),
                email: Some(email),
                phone,
                department,
                title,
                salary,
                date_hired,
                is_active: None,
            };
            let record = client.create_employee(draft).await?;
            println!("Created {} (#{})", record.full_name(), record.id.0);
        }
        Command::Edit {
            id,
            first_name,
            last_name,
            email,
            phone,
            department,
            title,
            salary,
            date_hired,
            active,
        } => {
            let draft = EmployeeDraft {
                first_name,
                last_name,
                email,
                phone,
                department,
                title,
                salary,
                date_hired,
                is_active: active,
            };
            if draft.is_empty() {
                bail!("no fields to update; pass at least one --flag");
            }
            let record = client.update_employee(EmployeeId(id), draft).await?;
            println!("Updated {} (#{})", record.full_name(), record.id.0);
        }
        Command::Remove { id, yes } => {
            // Populate the cache so the delete can name the record.
            client.refresh().await?;
            let name = client
                .cached_employees()
                .await
                .iter()
                .find(|employee| employee.id.0 == id)
                .map(|employee| employee.full_name())
                .unwrap_or_else(|| format!("#{id}"));
            if !yes && !confirm(&format!("Delete {name}? This cannot be undone."))? {
                println!("Aborted");
                return Ok(());
            }
            client.delete_employee(EmployeeId(id)).await?;
            println!("Deleted {name}");
        }
    }

    Ok(())
}
