use std::sync::Arc;

use cmdpal::kernel::services::adapters::{
    ensure_settings_file, get_storage_path, load_settings, JsonFileStore,
};
use cmdpal::kernel::services::ports::{KeyValueStore, MemoryStore, PaletteSettings};
use cmdpal::kernel::{parse_query, Action, Palette, PaletteRow, PaletteServices};

mod demo;
mod logging;

struct Args {
    query: String,
    run: Option<String>,
    pin: Option<String>,
    keys: Vec<String>,
    ephemeral: bool,
    confirm: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        query: String::new(),
        run: None,
        pin: None,
        keys: Vec::new(),
        ephemeral: false,
        confirm: false,
    };
    let mut words = Vec::new();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--run" => args.run = iter.next(),
            "--pin" => args.pin = iter.next(),
            "--key" => args.keys.extend(iter.next()),
            "--ephemeral" => args.ephemeral = true,
            "--yes" => args.confirm = true,
            _ => words.push(arg),
        }
    }
    args.query = words.join(" ");
    args
}

fn print_rows(palette: &Palette) {
    let state = palette.state();
    if let Some(parsed) = parse_query(&state.query) {
        println!("intent: {} target: {:?}", parsed.intent.as_str(), parsed.target);
    }
    for (index, row) in palette.rows().iter().enumerate() {
        let marker = if index == state.selected { '>' } else { ' ' };
        match row {
            PaletteRow::Command {
                command,
                score,
                pinned,
                drilldown,
            } => println!(
                "{marker} {:<28} {:<20} score={score}{}{}",
                command.label,
                command.id,
                if *pinned { " [pinned]" } else { "" },
                if drilldown.is_some() { " >" } else { "" },
            ),
            PaletteRow::Calculator(calculation) => {
                println!("{marker} = {}", calculation.display)
            }
            PaletteRow::Candidate(candidate) => println!(
                "{marker} {:<28} {:?} score={}",
                candidate.label, candidate.kind, candidate.score
            ),
            PaletteRow::Field { field, value } => {
                println!("{marker} {}: {value}", field.label)
            }
        }
    }
}

fn main() {
    let args = parse_args();

    if let Err(error) = ensure_settings_file() {
        eprintln!("settings: {error}");
    }
    let settings = load_settings().unwrap_or_else(PaletteSettings::default);
    let _logging = logging::init(&settings.log_filter);

    let storage: Arc<dyn KeyValueStore> = match get_storage_path(&settings.storage_file) {
        Some(path) if !args.ephemeral => Arc::new(JsonFileStore::new(path)),
        _ => Arc::new(MemoryStore::new()),
    };
    let services = PaletteServices {
        storage,
        host: Arc::new(demo::StdoutHost),
        notifier: Arc::new(demo::StdoutNotifier),
        confirmer: Arc::new(demo::FixedConfirmer(args.confirm)),
        directory: Arc::new(demo::directory()),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("runtime: {error}");
            return;
        }
    };

    runtime.block_on(async move {
        let mut palette = Palette::new(settings, services);
        demo::register(palette.registry_mut());
        palette.load().await;

        if let Some(id) = &args.pin {
            let pinned = palette.toggle_pin(id).await;
            println!("{id} pinned: {pinned}");
        }
        if let Some(id) = &args.run {
            let outcome = palette.execute_command(id).await;
            println!("{id}: {outcome:?}");
            return;
        }

        palette.handle(Action::Open).await;
        palette.handle(Action::SetQuery(args.query.clone())).await;
        print_rows(&palette);

        for key in &args.keys {
            let resolution = palette.invoke(key).await;
            println!("{key}: {resolution:?}");
            if palette.state().visible {
                print_rows(&palette);
            }
        }
    });
}
