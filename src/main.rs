mod calendar;
mod config;
mod error;
mod models;
mod store;

use clap::Parser;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use log::debug;
use store::{Store, DATE_FORMAT};

const BANNER: &str = r#"
                    ▐▓█▀▀▀▀▀▀▀▀▀█▓▌░▄▄▄▄▄░
                    ▐▓█░░▀░░▀▄░░█▓▌░█▄▄▄█░
                    ▐▓█░░▄░░▄▀░░█▓▌░█▄▄▄█░
                    ▐▓█▄▄▄▄▄▄▄▄▄█▓▌░█████░
                    ░░░░▄▄███▄▄░░░░░█████░
"#;

#[derive(Parser, Debug)]
#[command(author, version, about = "Software patches and updates log")]
struct Args {
    #[arg(
        long,
        help = "Data file to use (default: $SPAUS_DATA, ~/.spaus/config.json, ./spaus_data.txt)",
        value_name = "PATH"
    )]
    file: Option<PathBuf>,

    #[arg(short, long, help = "Show debug logging")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let path = config::get_data_path(args.file)?;
    let mut store = Store::new(path);
    debug!("Data file: {}", store.path().display());

    // A broken file still leaves the menu usable with whatever was read
    if let Err(e) = store.load() {
        println!("\n>> {}", e);
    }

    ctrlc::set_handler(|| {
        println!("\n\n>> Exiting the program...");
        process::exit(0);
    })?;

    loop {
        print_menu();

        let Some(choice) = next_choice(&mut io::stdin().lock()) else {
            println!("\n>> Exiting the program...");
            break;
        };

        let result = match choice.as_str() {
            "1" => handle_add_update(&mut store),
            "2" => handle_add_patch(&mut store),
            "3" => handle_display_all(&store),
            "4" => handle_search_by_date(&store),
            "5" => handle_search_by_version(&store),
            "6" => handle_delete(&mut store),
            "7" => handle_future_plan(&mut store),
            "8" => {
                println!("\n>> Exiting the program...");
                break;
            }
            _ => {
                println!("\n>> Invalid choice. Please enter a valid option.");
                Ok(())
            }
        };

        if let Err(e) = result {
            if is_eof(e.as_ref()) {
                println!("\n>> Exiting the program...");
                break;
            }
            println!("\n>> An error occurred: {}", e);
        }
    }

    Ok(())
}

fn print_menu() {
    println!("{}", BANNER);
    println!("\n▂▃▅▇█▓▒░ Welcome to Software Patches and Updates System ░▒▓█▇▅▃▂");
    println!("\n➠ 1. Add Update");
    println!("➠ 2. Add Patch");
    println!("➠ 3. Display All Updates and Patches");
    println!("➠ 4. Search by Date");
    println!("➠ 5. Search by Version");
    println!("➠ 6. Delete a Software Update/Patch Log");
    println!("➠ 7. Set Future Update");
    println!("➠ 8. Exit");
}

/// Reads the menu choice. Unreadable input is reported and asked again;
/// `None` means the input is closed.
fn next_choice<R: BufRead>(input: &mut R) -> Option<String> {
    loop {
        print!("\nEnter your choice: ");
        // A failed flush only delays the prompt text
        let _ = io::stdout().flush();

        match read_input(input) {
            Ok(choice) => return Some(choice),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return None,
            Err(e) => println!("\n>> An error occurred: {}", e),
        }
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    read_input(&mut io::stdin().lock())
}

fn read_input<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_string())
}

/// Reads a 1-based list position and returns it zero-based.
fn prompt_position(label: &str) -> io::Result<Option<usize>> {
    let input = prompt(label)?;
    Ok(input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)))
}

fn is_eof(e: &(dyn Error + 'static)) -> bool {
    e.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::UnexpectedEof)
}

fn handle_add_update(store: &mut Store) -> Result<(), Box<dyn Error>> {
    let app = prompt("\nEnter App Name: ")?;
    let date = prompt("Enter Date of Update (YYYY-MM-DD): ")?;
    let version = prompt("Enter Version: ")?;
    let remarks = prompt("Enter Remarks: ")?;

    match store.add_update(&app, &date, &version, &remarks) {
        Ok(()) => println!("\n>> Update logged successfully!"),
        Err(e) => println!("\n>> {}", e),
    }
    Ok(())
}

fn handle_add_patch(store: &mut Store) -> Result<(), Box<dyn Error>> {
    let app = prompt("\nEnter App Name: ")?;
    let date = prompt("Enter Date of Patch (YYYY-MM-DD): ")?;
    let version = prompt("Enter Version: ")?;
    let patch_type = prompt("Enter Patch Type: ")?;
    let remarks = prompt("Enter Remarks: ")?;

    match store.add_patch(&app, &date, &version, &patch_type, &remarks) {
        Ok(()) => println!("\n>> Patch logged successfully!"),
        Err(e) => println!("\n>> {}", e),
    }
    Ok(())
}

fn handle_display_all(store: &Store) -> Result<(), Box<dyn Error>> {
    if let Err(e) = store.display_all(&mut io::stdout().lock()) {
        println!("\n>> {}", e);
    }
    Ok(())
}

fn handle_search_by_date(store: &Store) -> Result<(), Box<dyn Error>> {
    let app = prompt("\nEnter App Name: ")?;
    let Ok(year) = prompt("Year (YYYY): ")?.parse::<i32>() else {
        println!("\n>> Invalid year. Please enter a number.");
        return Ok(());
    };
    let Ok(month) = prompt("Month (MM): ")?.parse::<u32>() else {
        println!("\n>> Invalid month. Please enter a number.");
        return Ok(());
    };

    let dates = match store.available_dates_in_month(&app, year, month) {
        Ok(dates) => dates,
        Err(e) => {
            println!("\n>> {}", e);
            return Ok(());
        }
    };

    if let Some(grid) = calendar::render_month(year, month, &dates) {
        println!("\n{}", grid);
    }
    println!(">> Dates in the specified month with updates or patches:");
    for date in &dates {
        println!("{}", date.format(DATE_FORMAT));
    }

    let value = prompt("\nEnter Date (YYYY-MM-DD): ")?;
    print_search(store, &app, "Date", &value);
    Ok(())
}

fn handle_search_by_version(store: &Store) -> Result<(), Box<dyn Error>> {
    let app = prompt("\nEnter App Name: ")?;
    let version = prompt("Enter Version: ")?;
    print_search(store, &app, "Version", &version);
    Ok(())
}

fn print_search(store: &Store, app: &str, field_name: &str, value: &str) {
    match store.search_by_field(app, field_name, value) {
        Ok(matches) => {
            for entry in matches {
                println!("\n>> App Name: {} | {}", app, entry.summary());
            }
        }
        Err(e) if e.is_not_found() => println!("\n>> {}", e),
        Err(e) => println!("\n>> Search failed: {}", e),
    }
}

fn handle_delete(store: &mut Store) -> Result<(), Box<dyn Error>> {
    if let Err(e) = store.load() {
        println!("\n>> {}", e);
        return Ok(());
    }

    if store.is_empty() {
        println!("\n>> No updates or patches recorded yet.");
        return Ok(());
    }

    println!("\n>> List of Software Patches and Updates");
    for (i, app) in store.apps().iter().enumerate() {
        println!("\n {}. {}", i + 1, app.name);
        for (j, entry) in app.entries.iter().enumerate() {
            println!("   {}. {}", j + 1, entry.summary());
        }
    }

    loop {
        let Some(app_index) = prompt_position("\nSelect the app: ")? else {
            println!("\n>> Invalid choice. Please enter a number.");
            continue;
        };
        let Some(app_name) = store.apps().get(app_index).map(|app| app.name.clone()) else {
            println!("\n>> Invalid choice.");
            continue;
        };

        let label = format!("\nSelect an update/patch log to delete for {}: ", app_name);
        let Some(entry_index) = prompt_position(&label)? else {
            println!("\n>> Invalid choice. Please enter a number.");
            continue;
        };

        match store.delete_entry(app_index, entry_index) {
            Ok(_) => {
                println!("\n>> Software log deleted successfully!");
                break;
            }
            Err(e) if e.is_validation() => println!("\n>> {}", e),
            Err(e) => {
                println!("\n>> {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn handle_future_plan(store: &mut Store) -> Result<(), Box<dyn Error>> {
    let app = prompt("\nEnter App Name: ")?;
    let date = prompt("Set Future Date of Update (YYYY-MM-DD): ")?;
    let version = prompt("Enter Version: ")?;
    let notes = prompt("Enter Notes: ")?;

    match store.set_future_plan(&app, &date, &version, &notes) {
        Ok(()) => println!("\n>> Future update set successfully!"),
        Err(e) => println!("\n>> {}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_invalid_utf8_choice_is_reported_and_skipped() {
        let mut input = Cursor::new(b"\xff\n8\n".to_vec());
        assert_eq!(next_choice(&mut input), Some("8".to_string()));
        assert_eq!(next_choice(&mut input), None);
    }

    #[test]
    fn test_closed_input_ends_menu() {
        assert_eq!(next_choice(&mut Cursor::new(Vec::new())), None);
        assert_eq!(next_choice(&mut Cursor::new(b"\xfe\n".to_vec())), None);
    }

    #[test]
    fn test_read_input_trims() {
        let mut input = Cursor::new(b"  3 \r\nnext\n".to_vec());
        assert_eq!(read_input(&mut input).unwrap(), "3");
        assert_eq!(read_input(&mut input).unwrap(), "next");
        assert_eq!(read_input(&mut input).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
