use budget_tracker::config::DatabaseConfig;
use budget_tracker::db::{self, Database};
use budget_tracker::operations::{OperationError, add, budget, listing, spending, stats};
use log::{error, warn};
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ViewUsers,
    ViewCategories,
    ViewBudgets,
    ViewTransactions,
    BudgetDetails,
    UserTransactions,
    SpendingSummary,
    RulesWithSpending,
    CreateTransaction,
    Statistics,
    Exit,
    Invalid,
}

enum Flow {
    Continue,
    Exit,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let db = match db::connection::establish_database(&config) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    display_header();
    println!("Welcome to Budget Tracker!");
    println!("Database connected successfully.");

    let result = run(&db);
    db.shutdown();
    println!("Goodbye!");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Console loop failed: {}", e);
            eprintln!("\nFatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(db: &Database) -> io::Result<()> {
    loop {
        display_menu();
        let Some(choice) = read_user_input("Enter your choice")? else {
            break;
        };

        let flow = match check_for_command(&choice) {
            MenuChoice::ViewUsers => report("retrieving users", listing::view_all_users(db)),
            MenuChoice::ViewCategories => {
                report("retrieving categories", listing::view_all_categories(db))
            }
            MenuChoice::ViewBudgets => report("retrieving budgets", listing::view_all_budgets(db)),
            MenuChoice::ViewTransactions => {
                report("retrieving transactions", listing::view_all_transactions(db))
            }
            MenuChoice::BudgetDetails => match read_user_input("Enter Budget ID")? {
                Some(input) => report(
                    "retrieving budget details",
                    budget::view_budget_details(db, &input),
                ),
                None => Flow::Exit,
            },
            MenuChoice::UserTransactions => match read_user_input("Enter User ID")? {
                Some(input) => report(
                    "retrieving user transactions",
                    spending::view_user_transactions(db, &input),
                ),
                None => Flow::Exit,
            },
            MenuChoice::SpendingSummary => spending_summary(db)?,
            MenuChoice::RulesWithSpending => match read_user_input("Enter Budget ID")? {
                Some(input) => report(
                    "retrieving budget rules",
                    budget::view_rules_with_spending(db, &input),
                ),
                None => Flow::Exit,
            },
            MenuChoice::CreateTransaction => create_transaction(db)?,
            MenuChoice::Statistics => report("retrieving statistics", stats::show_statistics(db)),
            MenuChoice::Exit => {
                println!("\nThank you for using Budget Tracker!");
                break;
            }
            MenuChoice::Invalid => {
                println!("\nInvalid choice. Please try again.");
                Flow::Continue
            }
        };

        if let Flow::Exit = flow {
            break;
        }
        if !pause()? {
            break;
        }
    }
    Ok(())
}

fn spending_summary(db: &Database) -> io::Result<Flow> {
    let Some(user) = read_user_input("Enter User ID")? else {
        return Ok(Flow::Exit);
    };
    let Some(start) = read_user_input("Enter Start Date (YYYY-MM-DD)")? else {
        return Ok(Flow::Exit);
    };
    let Some(end) = read_user_input("Enter End Date (YYYY-MM-DD)")? else {
        return Ok(Flow::Exit);
    };
    Ok(report(
        "retrieving spending summary",
        spending::view_spending_summary(db, &user, &start, &end),
    ))
}

fn create_transaction(db: &Database) -> io::Result<Flow> {
    print!("{}", add::header());

    let Some(user_input) = read_user_input("Enter User ID")? else {
        return Ok(Flow::Exit);
    };
    let user = match spending::find_user(db, &user_input) {
        Ok(user) => user,
        Err(e) => return Ok(report::<String>("creating transaction", Err(e))),
    };
    match add::category_choices(db) {
        Ok(choices) => print!("{}", choices),
        Err(e) => return Ok(report::<String>("creating transaction", Err(e))),
    }

    let mut answers = Vec::with_capacity(5);
    for label in [
        "Enter Category ID",
        "Enter Amount (e.g., 45.67)",
        "Enter Date (YYYY-MM-DD)",
        "Enter Description",
        "Enter Payment Method",
    ] {
        match read_user_input(label)? {
            Some(answer) => answers.push(answer),
            None => return Ok(Flow::Exit),
        }
    }

    let result = add::create_transaction(
        user.id,
        &answers[0],
        &answers[1],
        &answers[2],
        &answers[3],
        &answers[4],
    )
    .and_then(|transaction| add::add_transaction_to_db(db, &transaction));
    match result {
        Ok(id) => println!("\n✓ Transaction created successfully! ID: {}", id),
        Err(e) => {
            report::<String>("creating transaction", Err(e));
        }
    }
    Ok(Flow::Continue)
}

/// Prints an action's output, or its error without leaving the menu loop.
fn report<T: std::fmt::Display>(action: &str, result: Result<T, OperationError>) -> Flow {
    match result {
        Ok(output) => print!("{}", output),
        Err(OperationError::Database(e)) => {
            warn!("Database error while {}: {}", action, e);
            println!("Error {}: {}", action, e);
        }
        Err(e) => println!("{}", e),
    }
    Flow::Continue
}

fn display_header() {
    println!("\n{}", "=".repeat(60));
    println!("{}BUDGET TRACKER APPLICATION", " ".repeat(15));
    println!("{}\n", "=".repeat(60));
}

fn display_menu() {
    println!("\n--- MAIN MENU ---");
    println!("1. View All Users");
    println!("2. View All Categories");
    println!("3. View All Budgets");
    println!("4. View All Transactions");
    println!("5. View Budget Details");
    println!("6. View User Transactions");
    println!("7. View Spending Summary");
    println!("8. View Budget Rules with Spending");
    println!("9. Create New Transaction");
    println!("10. Database Statistics");
    println!("0. Exit");
    println!("{}", "-".repeat(40));
}

/// Returns `None` once standard input is exhausted.
fn read_user_input(prompt: &str) -> io::Result<Option<String>> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn pause() -> io::Result<bool> {
    print!("\nPress Enter to continue...");
    io::stdout().flush()?;
    let mut input = String::new();
    Ok(io::stdin().read_line(&mut input)? > 0)
}

fn check_for_command(input: &str) -> MenuChoice {
    match input.trim() {
        "1" => MenuChoice::ViewUsers,
        "2" => MenuChoice::ViewCategories,
        "3" => MenuChoice::ViewBudgets,
        "4" => MenuChoice::ViewTransactions,
        "5" => MenuChoice::BudgetDetails,
        "6" => MenuChoice::UserTransactions,
        "7" => MenuChoice::SpendingSummary,
        "8" => MenuChoice::RulesWithSpending,
        "9" => MenuChoice::CreateTransaction,
        "10" => MenuChoice::Statistics,
        "0" => MenuChoice::Exit,
        _ => MenuChoice::Invalid,
    }
}
