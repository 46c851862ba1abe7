//! Interactive line-based gallery shell.
//!
//! The shell is the rendering layer: it subscribes to the gallery store and
//! redraws after committed changes. Input is one command per line:
//!
//! ```text
//! type mars            live search (filters now, queries after the debounce)
//! search mars          query immediately
//! filter year 2021     set a filter; an empty value clears it
//! page 3 | next | prev
//! view 2 | view next | zoom in | close
//! collection create Mars Trip | Rover favourites
//! collection add 1 PIA23764
//! set layout list | theme
//! ```
//!
//! Images and collections can be referenced by id or by their 1-based
//! position in the current listing.
//!
//! Parsing is a pure function ([`parse_command`]) so the grammar is tested
//! without a terminal.

use crate::client::ImageSource;
use crate::debounce::Debouncer;
use crate::filter::FilterField;
use crate::gallery::{GalleryEvent, NewImage};
use crate::output;
use crate::session::Gallery;
use crate::settings::{KeyValueStorage, Layout, PreferencesPatch, SettingsStore, Theme};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Live search input, subject to the debounce.
    Type(String),
    /// Search immediately, bypassing the debounce.
    Search(String),
    Clear,
    Filter { field: FilterField, value: String },
    Page(u32),
    NextPage,
    PreviousPage,
    List,
    Years,
    Add(NewImage),
    Remove(String),
    View(String),
    ViewStep(Step),
    Close,
    ZoomIn,
    ZoomOut,
    Collections,
    CreateCollection { name: String, description: Option<String> },
    DeleteCollection(String),
    AddToCollection { collection: String, image: String },
    RemoveFromCollection { collection: String, image: String },
    Settings,
    Set(PreferencesPatch),
    ToggleTheme,
    Quit,
}

pub const HELP: &[&str] = &[
    "Commands",
    "    type <text>                      live search (waits for a pause)",
    "    search <text>                    search now",
    "    clear                            clear the search",
    "    filter <year|media|center> [v]   set or clear a filter",
    "    page <n> | next | prev           change page",
    "    list | years                     show images or year choices",
    "    add <url> <title> [| desc]       add a local image",
    "    remove <image>                   remove an image",
    "    view <image|next|prev> | close   open the viewer",
    "    zoom <in|out>                    zoom the viewer",
    "    collections                      list collections",
    "    collection create <name> [| desc]",
    "    collection delete <collection>",
    "    collection add <collection> <image>",
    "    collection remove <collection> <image>",
    "    settings | theme                 show settings or toggle theme",
    "    set <background|font-size|layout|theme> <value>",
    "    quit",
];

/// Split `text` at the first `|` into trimmed halves.
fn split_pipe(text: &str) -> (&str, Option<&str>) {
    match text.split_once('|') {
        Some((head, tail)) => (head.trim(), Some(tail.trim())),
        None => (text.trim(), None),
    }
}

/// Split off the first whitespace-delimited word.
fn first_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn two_args(rest: &str, usage: &'static str) -> Result<(String, String), ParseError> {
    let (a, rest) = first_word(rest);
    let (b, extra) = first_word(rest);
    if a.is_empty() || b.is_empty() || !extra.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    Ok((a.to_string(), b.to_string()))
}

fn one_arg(rest: &str, usage: &'static str) -> Result<String, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    Ok(rest.to_string())
}

fn parse_collection(rest: &str) -> Result<Command, ParseError> {
    let (sub, rest) = first_word(rest);
    match sub {
        "create" => {
            let (name, description) = split_pipe(rest);
            if name.is_empty() {
                return Err(ParseError::Usage("collection create <name> [| description]"));
            }
            Ok(Command::CreateCollection {
                name: name.to_string(),
                description: description.map(str::to_string),
            })
        }
        "delete" => Ok(Command::DeleteCollection(one_arg(
            rest,
            "collection delete <collection>",
        )?)),
        "add" => {
            let (collection, image) = two_args(rest, "collection add <collection> <image>")?;
            Ok(Command::AddToCollection { collection, image })
        }
        "remove" => {
            let (collection, image) = two_args(rest, "collection remove <collection> <image>")?;
            Ok(Command::RemoveFromCollection { collection, image })
        }
        _ => Err(ParseError::Usage("collection <create|delete|add|remove> ...")),
    }
}

fn parse_set(rest: &str) -> Result<Command, ParseError> {
    const USAGE: &str = "set <background|font-size|layout|theme> <value>";
    let (field, value) = first_word(rest);
    if value.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    let mut patch = PreferencesPatch::default();
    match field {
        "background" | "background-color" => patch.background_color = Some(value.to_string()),
        "font-size" | "font" => {
            let size = value
                .parse::<u32>()
                .map_err(|_| ParseError::Invalid(format!("font size must be a number, got '{value}'")))?;
            patch.font_size = Some(size);
        }
        "layout" => patch.layout = Some(value.parse::<Layout>().map_err(ParseError::Invalid)?),
        "theme" => patch.theme = Some(value.parse::<Theme>().map_err(ParseError::Invalid)?),
        _ => return Err(ParseError::Usage(USAGE)),
    }
    Ok(Command::Set(patch))
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let (head, rest) = first_word(line);
    match head {
        "help" | "?" => Ok(Command::Help),
        "type" => Ok(Command::Type(rest.to_string())),
        "search" => Ok(Command::Search(rest.to_string())),
        "clear" => Ok(Command::Clear),
        "filter" => {
            let (field, value) = first_word(rest);
            if field.is_empty() {
                return Err(ParseError::Usage("filter <year|media|center> [value]"));
            }
            let field = field.parse::<FilterField>().map_err(ParseError::Invalid)?;
            Ok(Command::Filter {
                field,
                value: value.to_string(),
            })
        }
        "page" => rest
            .parse::<u32>()
            .map(Command::Page)
            .map_err(|_| ParseError::Usage("page <n>")),
        "next" => Ok(Command::NextPage),
        "prev" | "previous" => Ok(Command::PreviousPage),
        "list" | "ls" => Ok(Command::List),
        "years" => Ok(Command::Years),
        "add" => {
            const USAGE: &str = "add <url> <title> [| description]";
            let (url, rest) = first_word(rest);
            let (title, description) = split_pipe(rest);
            if url.is_empty() || title.is_empty() {
                return Err(ParseError::Usage(USAGE));
            }
            Ok(Command::Add(NewImage {
                title: title.to_string(),
                description: description.unwrap_or_default().to_string(),
                url: url.to_string(),
                date: None,
            }))
        }
        "remove" | "rm" => Ok(Command::Remove(one_arg(rest, "remove <image>")?)),
        "view" => match rest {
            "" => Err(ParseError::Usage("view <image|next|prev>")),
            "next" => Ok(Command::ViewStep(Step::Next)),
            "prev" | "previous" => Ok(Command::ViewStep(Step::Previous)),
            image => Ok(Command::View(image.to_string())),
        },
        "close" => Ok(Command::Close),
        "zoom" => match rest {
            "in" | "+" => Ok(Command::ZoomIn),
            "out" | "-" => Ok(Command::ZoomOut),
            _ => Err(ParseError::Usage("zoom <in|out>")),
        },
        "collections" => Ok(Command::Collections),
        "collection" => parse_collection(rest),
        "settings" => Ok(Command::Settings),
        "set" => parse_set(rest),
        "theme" => Ok(Command::ToggleTheme),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

/// Shell state: the session, preferences and the search debouncer.
pub struct Shell<S, K> {
    gallery: Gallery<S>,
    settings: SettingsStore<K>,
    debouncer: Debouncer<String>,
    settled: tokio::sync::mpsc::UnboundedReceiver<String>,
    dirty: Rc<Cell<bool>>,
}

impl<S: ImageSource, K: KeyValueStorage> Shell<S, K> {
    pub fn new(mut gallery: Gallery<S>, settings: SettingsStore<K>, debounce: Duration) -> Self {
        let (debouncer, settled) = Debouncer::new(debounce);
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        gallery.store_mut().subscribe(move |event| {
            if !matches!(event, GalleryEvent::LoadStarted) {
                flag.set(true);
            }
        });
        Self {
            gallery,
            settings,
            debouncer,
            settled,
            dirty,
        }
    }

    /// Run until `quit` or end of input.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("NASA image gallery. Type 'help' for commands.");
        self.gallery.refresh().await;

        loop {
            if self.dirty.replace(false) {
                self.render();
            }
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_command(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.execute(command).await,
                        Err(err) => eprintln!("{err}"),
                    }
                }
                Some(text) = self.settled.recv() => {
                    self.gallery.settle_search(&text).await;
                }
            }
        }
        Ok(())
    }

    fn render(&self) {
        let visible = self.gallery.filtered_images();
        output::print_gallery(
            self.gallery.store(),
            self.gallery.filters(),
            &visible,
            self.settings.get().layout,
        );
    }

    /// Resolve a 1-based listing position or an id to a visible image id.
    fn resolve_image(&self, reference: &str) -> Option<String> {
        let visible = self.gallery.filtered_images();
        let by_position = reference
            .parse::<usize>()
            .ok()
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|i| visible.get(i).copied());
        by_position
            .or_else(|| self.gallery.store().image(reference))
            .map(|img| img.id.clone())
    }

    fn resolve_collection(&self, reference: &str) -> Option<String> {
        let collections = self.gallery.collections();
        let by_position = reference
            .parse::<usize>()
            .ok()
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|i| collections.collections().get(i));
        by_position
            .or_else(|| collections.get(reference))
            .map(|c| c.id.clone())
    }

    fn show_viewer(&self) {
        match self.gallery.viewed_image() {
            Some(image) => {
                for line in output::format_viewer(image, self.gallery.viewer().zoom()) {
                    println!("{line}");
                }
            }
            None => println!("No image open."),
        }
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::Help => HELP.iter().for_each(|line| println!("{line}")),
            Command::Type(text) => {
                self.gallery.input_search(&text);
                self.debouncer.push(text);
                self.dirty.set(true);
            }
            Command::Search(text) => {
                self.debouncer.cancel();
                self.gallery.input_search(&text);
                if !self.gallery.settle_search(&text).await {
                    self.dirty.set(true);
                }
            }
            Command::Clear => {
                self.gallery.clear_search();
                self.debouncer.push(String::new());
                self.dirty.set(true);
            }
            Command::Filter { field, value } => {
                if !self.gallery.set_filter(field, &value).await {
                    println!("{field} filter unchanged.");
                }
            }
            Command::Page(n) => {
                if !self.gallery.go_to_page(n).await {
                    let total = self.gallery.store().pagination().total_pages();
                    println!("No page {n} (1-{total}).");
                }
            }
            Command::NextPage => {
                if !self.gallery.next_page().await {
                    println!("Already on the last page.");
                }
            }
            Command::PreviousPage => {
                if !self.gallery.previous_page().await {
                    println!("Already on the first page.");
                }
            }
            Command::List => self.render(),
            Command::Years => {
                for line in output::format_years(&self.gallery.store().unique_years()) {
                    println!("{line}");
                }
            }
            Command::Add(new) => match self.gallery.add_local_image(new) {
                Some(id) => println!("Added {id}."),
                None => println!("An image needs a title and a URL."),
            },
            Command::Remove(reference) => {
                let removed = self
                    .resolve_image(&reference)
                    .is_some_and(|id| self.gallery.remove_image(&id));
                if !removed {
                    println!("No image '{reference}'.");
                }
            }
            Command::View(reference) => {
                let opened = self
                    .resolve_image(&reference)
                    .is_some_and(|id| self.gallery.open_image(&id));
                if opened {
                    self.show_viewer();
                } else {
                    println!("No image '{reference}'.");
                }
            }
            Command::ViewStep(step) => {
                let moved = match step {
                    Step::Next => self.gallery.view_next(),
                    Step::Previous => self.gallery.view_previous(),
                };
                if moved {
                    self.show_viewer();
                } else {
                    println!("Nothing further in that direction.");
                }
            }
            Command::Close => self.gallery.close_viewer(),
            Command::ZoomIn => {
                self.gallery.zoom_in();
                self.show_viewer();
            }
            Command::ZoomOut => {
                self.gallery.zoom_out();
                self.show_viewer();
            }
            Command::Collections => output::print_collections(self.gallery.collections()),
            Command::CreateCollection { name, description } => {
                match self
                    .gallery
                    .collections_mut()
                    .create_collection(&name, description.as_deref())
                {
                    Some(id) => println!("Created collection {id}."),
                    None => println!("A collection needs a name."),
                }
            }
            Command::DeleteCollection(reference) => {
                let deleted = self
                    .resolve_collection(&reference)
                    .is_some_and(|id| self.gallery.collections_mut().delete_collection(&id));
                if !deleted {
                    println!("No collection '{reference}'.");
                }
            }
            Command::AddToCollection { collection, image } => {
                let (Some(cid), Some(iid)) =
                    (self.resolve_collection(&collection), self.resolve_image(&image))
                else {
                    println!("Unknown collection or image.");
                    return;
                };
                if !self.gallery.add_to_collection(&cid, &iid) {
                    println!("Already in that collection.");
                }
            }
            Command::RemoveFromCollection { collection, image } => {
                let removed = self.resolve_collection(&collection).is_some_and(|cid| {
                    self.gallery
                        .collections_mut()
                        .remove_image_from_collection(&cid, &image)
                });
                if !removed {
                    println!("No image '{image}' in that collection.");
                }
            }
            Command::Settings => output::print_settings(self.settings.get()),
            Command::Set(patch) => match self.settings.update(patch) {
                Ok(prefs) => {
                    output::print_settings(prefs);
                    self.dirty.set(true);
                }
                Err(err) => eprintln!("{err}"),
            },
            Command::ToggleTheme => match self.settings.toggle_theme() {
                Ok(theme) => println!("Theme: {theme}"),
                Err(err) => eprintln!("{err}"),
            },
            Command::Quit => {}
        }
    }
}
