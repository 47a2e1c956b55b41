//! CLI module for the cardos application
//!
//! This module handles the command-line interface: every subcommand is one
//! discrete event applied to the library, followed by a whole-slot save.
use std::{
    fs::{self, read_to_string, OpenOptions},
    io::{stdin, stdout, BufRead, Write},
    path::{Path, PathBuf},
    process::Command,
    thread,
    time::Duration,
};

use chrono::Utc;
use console::{style, Term};
use log::{debug, info, warn};
use shell_words::split;
use tempfile::Builder;

use crate::{
    add_unique_tags, content_preview, copy_to_clipboard, export_file_name, hashtags, html_document,
    markdown_document, parse_tags, print_file, printable_document, share_text, share_via_command,
    visible_cards, Card, CardError, CardStore, CardType, Commands, Config, EditCardOptions, ExportFormat,
    FolderCommands, Library, ListCardsOptions, Result, Scope, Theme, TypeFilter, UpsertOutcome,
    ViewState,
};

const EDITOR_HEADER_END: &str = "-->";

/// CLI Application handler - processes CLI commands against the card library
pub struct App {
    /// Slot storage backing the library
    store: CardStore,

    /// The loaded cards, folders and view
    library: Library,

    /// Application configuration
    config: Config,

    /// Where `config --reset` writes to
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application, loading the library from the store
    pub fn new(store: CardStore, config: Config, config_path: PathBuf, verbose: bool) -> Self {
        let library = store.load_library();
        info!(
            "Loaded {} cards and {} folders from {}",
            library.cards().len(),
            library.folders().len(),
            store.data_dir().display()
        );

        Self {
            store,
            library,
            config,
            config_path,
            verbose,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        self.run_with_input(command, &mut stdin().lock())
    }

    /// Like `run`, with confirmation answers read from `input`
    pub fn run_with_input(&mut self, command: Commands, input: &mut impl BufRead) -> Result<()> {
        match command {
            Commands::New {
                title,
                content,
                card_type,
                tags,
                folder,
                file,
                edit,
            } => self.create_card(title, content, card_type, tags, folder, file, edit)?,

            Commands::View { id, json } => self.view_card(&id, json)?,

            Commands::List(options) => self.list_cards(options)?,

            Commands::Edit(options) => self.handle_edit(options)?,

            Commands::Delete { id, force } => self.handle_delete(&id, force, input)?,

            Commands::Tag {
                id,
                add,
                remove,
                list,
            } => self.handle_tag(&id, add, remove, list)?,

            Commands::Move { id, folder } => self.handle_move(&id, folder)?,

            Commands::Folder(command) => self.handle_folder(command, input)?,

            Commands::Scope { folder } => self.handle_scope(folder)?,

            Commands::Filter { card_type } => self.handle_filter(&card_type)?,

            Commands::Export { id, output, format } => self.handle_export(&id, output, format)?,

            Commands::Print { id } => self.handle_print(&id)?,

            Commands::Share { id } => self.handle_share(&id)?,

            Commands::Theme { value, toggle } => self.handle_theme(value, toggle)?,

            Commands::Orphans { json } => self.handle_orphans(json)?,

            Commands::Config { show, reset } => self.handle_config(show, reset)?,
        }

        Ok(())
    }

    /// Writes the cards, folders and view slots after a mutation
    fn persist(&self) -> Result<()> {
        self.store.save_library(&self.library)
    }

    fn find_card(&self, id: &str) -> Result<Card> {
        self.library
            .card(id)
            .cloned()
            .ok_or_else(|| CardError::CardNotFound { id: id.to_string() })
    }

    /// Resolves a folder given by id or name to its id
    fn resolve_folder_id(&self, reference: &str) -> Result<String> {
        self.library
            .resolve_folder(reference)
            .map(|f| f.id.clone())
            .ok_or_else(|| CardError::FolderNotFound {
                id: reference.to_string(),
            })
    }

    fn scope_name(&self, scope: &Scope) -> String {
        match scope {
            Scope::Inbox => "Inbox".to_string(),
            Scope::Folder(id) => self
                .library
                .folder(id)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_card(
        &mut self,
        title: String,
        content: Option<String>,
        card_type: CardType,
        tags: Option<String>,
        folder: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
    ) -> Result<()> {
        if title.trim().is_empty() {
            println!("A card needs a title; nothing was saved.");
            return Ok(());
        }

        let folder_id = folder.map(|f| self.resolve_folder_id(&f)).transpose()?;

        let card_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(file_path)) => self.read_content_from_file(&file_path)?,
            (None, None) => {
                if edit {
                    self.open_editor(&title, "")?
                } else {
                    String::new()
                }
            }
        };

        let card = Card::new(title, card_content, card_type, parse_tags(tags)).with_folder(folder_id);

        let id = card.id.clone();
        if self.library.save_card(card)? == UpsertOutcome::Updated {
            warn!("Card id {} was already taken; the earlier card was replaced", id);
            println!(
                "Warning: another card was created this minute with ID {}; it has been replaced.",
                id
            );
        }
        self.persist()?;
        println!("Card created with ID: {}", id);
        Ok(())
    }

    fn read_content_from_file(&self, file_path: &Path) -> Result<String> {
        if !file_path.exists() {
            return Err(CardError::FileNotFound {
                file_path: file_path.display().to_string(),
            });
        }

        if !file_path.is_file() {
            return Err(CardError::ApplicationError {
                message: format!("Not a file: {}", file_path.display()),
            });
        }

        read_to_string(file_path).map_err(CardError::Io)
    }

    /// Opens the configured editor on a temp file seeded with the existing content
    fn open_editor(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            writeln!(file, "<!-- Editing card: {}", title)?;
            writeln!(file, "Write the card content below. Markdown is supported.")?;
            writeln!(file, "Save and exit the editor when you're done. {}", EDITOR_HEADER_END)?;
            write!(file, "{}", existing_content)?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to write card content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(strip_editor_header(&content))
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        // Handle shell-like command parsing
        let args = split(editor_cmd).map_err(|e| CardError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let (program, rest) = args.split_first().ok_or_else(|| CardError::EditorError {
            message: "Empty editor command".to_string(),
        })?;

        let status = Command::new(program).args(rest).arg(file_path).status()?;

        if !status.success() {
            return Err(CardError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    fn view_card(&self, id: &str, json: bool) -> Result<()> {
        let card = self.find_card(id)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&card)?);
            return Ok(());
        }

        let folder = card
            .folder_id
            .as_deref()
            .map(|fid| self.scope_name(&Scope::Folder(fid.to_string())))
            .unwrap_or_else(|| "Inbox".to_string());

        println!("ID: {} | {} | {}", card.id, card.card_type.label(), folder);
        println!("Title: {}", style(&card.title).bold());
        if !card.tags.is_empty() {
            println!("Tags: {}", style(hashtags(&card.tags)).cyan());
        }
        if let Some(created) = card.created_local() {
            println!("Created: {}", created.format("%Y-%m-%d %H:%M"));
        }
        if !card.content.is_empty() {
            println!("\n{}", card.content);
        }
        Ok(())
    }

    /// Builds the view for a listing: the stored view, overridden by the options
    fn listing_view(&self, options: &ListCardsOptions) -> Result<ViewState> {
        let mut view = self.library.view().clone();

        if options.inbox {
            view.scope = Scope::Inbox;
        } else if let Some(folder) = &options.folder {
            view.scope = Scope::Folder(self.resolve_folder_id(folder)?);
        }

        if let Some(card_type) = &options.card_type {
            view.type_filter = card_type.parse()?;
        }

        if let Some(search) = &options.search {
            view.search = search.clone();
        }

        Ok(view)
    }

    /// List cards according to the current view and the provided overrides
    fn list_cards(&self, options: ListCardsOptions) -> Result<()> {
        let view = self.listing_view(&options)?;
        debug!("Listing with view {:?}", view);

        let mut cards = visible_cards(self.library.cards(), &view);
        if options.limit > 0 && cards.len() > options.limit {
            cards.truncate(options.limit);
        }

        if options.json {
            println!("{}", serde_json::to_string_pretty(&cards)?);
            return Ok(());
        }

        let filter = match view.type_filter {
            TypeFilter::All => "All Types".to_string(),
            TypeFilter::Only(card_type) => card_type.to_string(),
        };
        println!(
            "{}",
            style(format!("/ {} / {}", self.scope_name(&view.scope), filter)).dim()
        );

        if cards.is_empty() {
            println!("No cards found");
            return Ok(());
        }

        self.display_cards_text(&cards, options.detailed);
        println!(
            "\n{} card{}",
            cards.len(),
            if cards.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Display cards in text format
    fn display_cards_text(&self, cards: &[&Card], detailed: bool) {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, card) in cards.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let created = card
                .created_local()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            println!(
                "{} {} | Created: {}",
                style(card.card_type.label()).yellow(),
                card.id,
                created
            );
            println!("{}", style(&card.title).bold());

            if !card.tags.is_empty() {
                println!("{}", style(hashtags(&card.tags)).cyan());
            }

            if detailed {
                if !card.content.is_empty() {
                    println!("\n{}", card.content);
                }
            } else {
                let preview = content_preview(&card.content, term_width.saturating_sub(4).max(20));
                if !preview.is_empty() {
                    println!("{}", style(preview).dim());
                }
            }
        }
    }

    fn handle_edit(&mut self, options: EditCardOptions) -> Result<()> {
        // Validate input - check for conflicting options
        let content_sources = [
            options.content.is_some(),
            options.file.is_some(),
            options.edit,
        ];
        if content_sources.iter().filter(|set| **set).count() > 1 {
            return Err(CardError::ApplicationError {
                message: "Use only one of --content, --file and --edit".to_string(),
            });
        }

        let mut card = self.find_card(&options.id)?;

        if let Some(new_title) = options.title {
            if new_title.trim().is_empty() {
                println!("A card needs a title; nothing was saved.");
                return Ok(());
            }
            card.title = new_title;
        }

        if let Some(new_content) = options.content {
            card.content = new_content;
        } else if let Some(file_path) = options.file {
            card.content = self.read_content_from_file(&file_path)?;
            println!("Content updated from file: {}", file_path.display());
        } else if options.edit {
            card.content = self.open_editor(&card.title, &card.content)?;
            println!("Content updated from editor");
        }

        if let Some(card_type) = options.card_type {
            card.card_type = card_type;
        }

        let add = parse_tags(options.add_tags);
        let remove = parse_tags(options.remove_tags);
        add_unique_tags(&mut card.tags, &add);
        card.tags.retain(|tag| !remove.contains(tag));

        let id = card.id.clone();
        self.library.save_card(card)?;
        self.persist()?;

        println!("Card {} updated successfully", id);
        Ok(())
    }

    /// Asks a yes/no question on the terminal; anything but y/yes declines
    fn confirm(&self, input: &mut impl BufRead, question: &str) -> Result<bool> {
        print!("{} [y/N]: ", question);
        stdout().flush().map_err(CardError::Io)?;

        let mut answer = String::new();
        input.read_line(&mut answer).map_err(CardError::Io)?;

        let answer = answer.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    fn handle_delete(&mut self, id: &str, force: bool, input: &mut impl BufRead) -> Result<()> {
        let card = self.find_card(id)?;

        if !force {
            println!("You are about to delete the following card:");
            println!("ID:     {}", card.id);
            println!("Title:  {}", card.title);
            println!("Type:   {}", card.card_type);
            println!("Tags:   {}", card.tags.join(", "));

            if !card.content.is_empty() {
                let preview = card.content.lines().take(2).collect::<Vec<_>>().join("\n");
                println!("\nContent preview:");
                println!(
                    "{}{}",
                    preview,
                    if card.content.lines().count() > 2 {
                        "..."
                    } else {
                        ""
                    }
                );
            }

            println!("\nThis action cannot be undone!");
            if !self.confirm(input, "Delete this card?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.library.delete_card(id);
        self.persist()?;

        println!(
            "Card '{}' ({}) has been permanently deleted.",
            card.title, card.id
        );
        Ok(())
    }

    fn handle_tag(
        &mut self,
        id: &str,
        add: Option<String>,
        remove: Option<String>,
        list: bool,
    ) -> Result<()> {
        let add = parse_tags(add);
        let remove = parse_tags(remove);

        let card = if add.is_empty() && remove.is_empty() {
            self.find_card(id)?
        } else {
            let card = self.library.retag_card(id, &add, &remove)?;
            self.persist()?;
            println!("Tags of card {} updated", id);
            card
        };

        if list || self.verbose {
            if card.tags.is_empty() {
                println!("Card {} has no tags", card.id);
            } else {
                println!("{}", hashtags(&card.tags));
            }
        }
        Ok(())
    }

    fn handle_move(&mut self, id: &str, folder: Option<String>) -> Result<()> {
        let folder_id = folder.map(|f| self.resolve_folder_id(&f)).transpose()?;
        let destination = match &folder_id {
            Some(fid) => self.scope_name(&Scope::Folder(fid.clone())),
            None => "Inbox".to_string(),
        };

        self.library.move_card(id, folder_id)?;
        self.persist()?;
        println!("Card {} moved to {}", id, destination);
        Ok(())
    }

    fn handle_folder(&mut self, command: FolderCommands, input: &mut impl BufRead) -> Result<()> {
        match command {
            FolderCommands::Create { name } => {
                let folder = self.library.create_folder(&name)?;
                self.persist()?;
                println!("Folder '{}' created with ID: {}", folder.name, folder.id);
            }

            FolderCommands::List { json } => self.list_folders(json)?,

            FolderCommands::Rename { folder, name } => {
                let id = self.resolve_folder_id(&folder)?;
                self.library.rename_folder(&id, &name)?;
                self.persist()?;
                println!("Folder {} renamed to '{}'", id, name.trim());
            }

            FolderCommands::Delete { folder, force } => {
                let id = self.resolve_folder_id(&folder)?;
                let name = self.scope_name(&Scope::Folder(id.clone()));

                let question = format!("Delete folder '{}'? Cards will move to Inbox.", name);
                if !force && !self.confirm(input, &question)? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                let outcome = self.library.delete_folder(&id);
                self.persist()?;

                println!(
                    "Folder '{}' deleted; {} card{} moved to Inbox.",
                    name,
                    outcome.cards_unfiled,
                    if outcome.cards_unfiled == 1 { "" } else { "s" }
                );
                if outcome.scope_reset {
                    println!("Current scope is now Inbox.");
                }
            }
        }
        Ok(())
    }

    fn list_folders(&self, json: bool) -> Result<()> {
        let count_in = |scope: &Scope| {
            self.library
                .cards()
                .iter()
                .filter(|c| scope.contains(c))
                .count()
        };

        if json {
            let folders: Vec<serde_json::Value> = self
                .library
                .folders()
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "id": f.id,
                        "name": f.name,
                        "cards": count_in(&Scope::Folder(f.id.clone())),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&folders)?);
            return Ok(());
        }

        let current = &self.library.view().scope;
        let marker = |scope: &Scope| if scope == current { "*" } else { " " };

        println!("{} Inbox ({})", marker(&Scope::Inbox), count_in(&Scope::Inbox));
        for folder in self.library.folders() {
            let scope = Scope::Folder(folder.id.clone());
            println!(
                "{} {} ({}) [{}]",
                marker(&scope),
                folder.name,
                count_in(&scope),
                style(&folder.id).dim()
            );
        }
        Ok(())
    }

    fn handle_scope(&mut self, folder: Option<String>) -> Result<()> {
        let scope = match folder {
            Some(reference) => Scope::Folder(self.resolve_folder_id(&reference)?),
            None => Scope::Inbox,
        };

        self.library.select_scope(scope.clone())?;
        self.store.save_view(self.library.view())?;
        println!("Scope: {}", self.scope_name(&scope));
        Ok(())
    }

    fn handle_filter(&mut self, card_type: &str) -> Result<()> {
        let filter: TypeFilter = card_type.parse()?;
        self.library.set_type_filter(filter);
        self.store.save_view(self.library.view())?;

        match filter {
            TypeFilter::All => println!("Showing all card types"),
            TypeFilter::Only(t) => println!("Showing {} cards ({})", t, t.label()),
        }
        Ok(())
    }

    fn handle_export(&self, id: &str, output: Option<PathBuf>, format: ExportFormat) -> Result<()> {
        let card = self.find_card(id)?;
        let dir = output.unwrap_or_else(|| PathBuf::from("."));

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|_| CardError::DirectoryError { path: dir.clone() })?;
        }

        let document = match format {
            ExportFormat::Markdown => markdown_document(&card, Utc::now()),
            ExportFormat::Html => html_document(&card),
        };

        let path = dir.join(export_file_name(&card.title, format));
        fs::write(&path, document)?;
        info!("Exported card {} to {}", card.id, path.display());
        println!("Exported to {}", path.display());
        Ok(())
    }

    /// Renders the card into a temporary page, prints it, then removes the page.
    /// Printer failures are logged, not returned.
    fn handle_print(&self, id: &str) -> Result<()> {
        let card = self.find_card(id)?;

        let mut page = Builder::new()
            .prefix("cardos-print-")
            .suffix(".html")
            .tempfile()?;
        page.write_all(printable_document(&card).as_bytes())?;
        page.flush()?;

        match print_file(&self.config.get_print_command(), page.path()) {
            Ok(()) => println!("Card {} sent to the printer", card.id),
            Err(e) => warn!("Printing card {} failed: {}", card.id, e),
        }

        page.close()?;
        Ok(())
    }

    /// Shares through the configured command, or copies to the clipboard and shows
    /// a short-lived confirmation. Failures only suppress the confirmation.
    fn handle_share(&self, id: &str) -> Result<()> {
        let card = self.find_card(id)?;
        let text = share_text(&card.title, &card.content);

        if let Some(command) = &self.config.share_command {
            if let Err(e) = share_via_command(command, &text) {
                warn!("Sharing card {} failed: {}", card.id, e);
            }
            return Ok(());
        }

        match copy_to_clipboard(&text) {
            Ok(()) => self.flash("Copied!"),
            Err(e) => warn!("Copying card {} failed: {}", card.id, e),
        }
        Ok(())
    }

    /// Shows a message for the configured confirmation time, then clears it
    fn flash(&self, message: &str) {
        let term = Term::stdout();
        if !term.is_term() {
            println!("{}", message);
            return;
        }

        if term.write_line(&style(message).green().to_string()).is_ok() {
            thread::sleep(Duration::from_millis(self.config.share_confirmation_ms));
            let _ = term.clear_last_lines(1);
        }
    }

    fn handle_theme(&self, value: Option<String>, toggle: bool) -> Result<()> {
        let current = self.store.load_theme();

        let next = if toggle {
            Some(current.toggled())
        } else {
            value.map(|v| v.parse::<Theme>()).transpose()?
        };

        match next {
            Some(theme) => {
                self.store.save_theme(theme)?;
                println!("Theme: {}", theme);
            }
            None => println!("Theme: {}", current),
        }
        Ok(())
    }

    fn handle_orphans(&self, json: bool) -> Result<()> {
        let orphans = self.library.orphaned_cards();

        if json {
            println!("{}", serde_json::to_string_pretty(&orphans)?);
            return Ok(());
        }

        if orphans.is_empty() {
            println!("Every filed card belongs to an existing folder.");
            return Ok(());
        }

        println!("Cards filed into folders that no longer exist:");
        for card in orphans {
            println!(
                "  {} {} (folder {})",
                card.id,
                card.title,
                card.folder_id.as_deref().unwrap_or_default()
            );
        }
        println!("Use `cardos move <id>` to bring them back to the Inbox.");
        Ok(())
    }

    fn handle_config(&mut self, show: bool, reset: bool) -> Result<()> {
        if reset {
            let defaults = Config::default();
            defaults.save(&self.config_path)?;
            self.config = defaults;
            println!("Configuration reset: {}", self.config_path.display());
        }

        if show || !reset {
            println!("Config file: {}", self.config_path.display());
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }
}

/// Drops the instruction comment the editor template starts with
fn strip_editor_header(content: &str) -> String {
    if content.trim_start().starts_with("<!--") {
        if let Some(end) = content.find(EDITOR_HEADER_END) {
            let rest = &content[end + EDITOR_HEADER_END.len()..];
            return rest.strip_prefix('\n').unwrap_or(rest).to_string();
        }
    }
    content.to_string()
}
