use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{AppContext, Result, TilawaError};
use crate::cache::ReferenceKind;
use crate::domain::{
    AzkarCategory, AzkarSession, ContentUnit, LastRead, ModeKey, ReadingMode, SettingUpdate,
    Settings, SurahSummary, UnitKind,
};
use crate::normalizer::{search_azkar, search_surahs};
use crate::resume::{ResumeAction, ResumeDecision};
use crate::settings::BrightnessOutcome;

/// Options for [`read_unit`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadOptions {
    pub from: Option<u32>,
    pub resume: bool,
    pub scroll: Option<f64>,
    pub height: Option<f64>,
    pub limit: Option<usize>,
}

pub async fn welcome(ctx: &AppContext) -> Result<()> {
    if ctx.settings.has_onboarded().await {
        return Ok(());
    }

    println!("Welcome to Tilawa.");
    println!("Run `tilawa download` once to read the whole Quran offline.");
    ctx.settings.mark_onboarded().await;
    Ok(())
}

pub async fn list_surahs(ctx: &AppContext, refresh: bool) -> Result<()> {
    if refresh {
        println!("Refreshing surah list...");
        if ctx
            .cache
            .preload_reference_list(ReferenceKind::Surahs)
            .await
            .is_none()
        {
            eprintln!("Refresh failed, showing the saved list");
        }
    }

    let surahs = load_surahs(ctx).await?;
    let completion = ctx.progress.completion().await;

    for surah in &surahs {
        print_surah(surah, completion.is_completed(surah.number));
    }
    Ok(())
}

pub async fn search(ctx: &AppContext, query: &str, azkar: bool) -> Result<()> {
    if azkar {
        let categories = load_azkar(ctx).await?;
        let matches = search_azkar(&categories, query);
        if matches.is_empty() {
            println!("No categories match \"{}\"", query);
        }
        for category in matches {
            println!("{} ({} items)", category.category_name, category.items.len());
        }
        return Ok(());
    }

    let surahs = load_surahs(ctx).await?;
    let completion = ctx.progress.completion().await;
    let matches = search_surahs(&surahs, query);
    if matches.is_empty() {
        println!("No surahs match \"{}\"", query);
    }
    for surah in matches {
        print_surah(surah, completion.is_completed(surah.number));
    }
    Ok(())
}

pub async fn read_unit(
    ctx: &AppContext,
    kind: UnitKind,
    number: u16,
    opts: ReadOptions,
) -> Result<()> {
    kind.validate(number)?;

    let unit = ctx.cache.content_unit(kind, number).await.ok_or_else(|| {
        TilawaError::Other(format!(
            "Could not load {} {}. Check your connection and try again.",
            kind, number
        ))
    })?;
    if unit.is_empty() {
        println!("No ayahs in {} {}", kind, number);
        return Ok(());
    }

    let mode = match kind {
        UnitKind::Surah => ModeKey::surah(number),
        UnitKind::Juz => ModeKey::juz(number),
    };

    let saved_verse = ctx
        .progress
        .last_read()
        .await
        .filter(|lr| lr.mode_key() == Some(mode))
        .and_then(|lr| lr.verse);

    let (start, verse) = match opts.from {
        Some(from) => {
            let start = start_from(&unit, kind, from).ok_or_else(|| {
                TilawaError::Other(format!("No ayah {} in {} {}", from, kind, number))
            })?;
            (start, Some(unit.ayahs[start].number))
        }
        None => match resume_position(ctx, &unit, mode, opts.resume, saved_verse).await {
            Some(start) => (start, Some(unit.ayahs[start].number)),
            // The reader has not answered the resume offer yet; keep the
            // saved verse so a later --resume lands on it.
            None => (0, saved_verse),
        },
    };

    let name = unit_name(ctx, kind, number).await;
    let last_read = match kind {
        UnitKind::Surah => LastRead::surah(number, name.clone(), verse),
        UnitKind::Juz => LastRead::juz(number, name.clone(), verse),
    };
    ctx.progress.record_last_read(&last_read).await;

    if let (Some(scroll_y), Some(height)) = (opts.scroll, opts.height) {
        let mut scroll_saver = ctx.scroll_saver(mode);
        scroll_saver.observe(scroll_y);
        scroll_saver.flush().await;

        let mut verse_saver = ctx.verse_saver();
        if let Some(verse) = verse_saver.observe_scroll(&unit, scroll_y, height) {
            println!("Saved position near ayah {}", verse);
        }
        verse_saver.flush().await;
    }

    let settings = ctx.settings.load_settings().await;
    println!("{} ({} ayahs, font {})", name, unit.len(), settings.font_size);
    println!();

    let limit = opts.limit.unwrap_or(usize::MAX);
    for ayah in unit.ayahs.iter().skip(start).take(limit) {
        match (kind, ayah.surah) {
            (UnitKind::Juz, Some(surah)) => {
                println!("{:>3}:{:<4} {}", surah.number, ayah.number_in_surah, ayah.text)
            }
            _ => println!("{:>4}  {}", ayah.number_in_surah, ayah.text),
        }
    }

    Ok(())
}

/// `from` is the ayah number within the surah for surahs and the global
/// ayah number for juz.
fn start_from(unit: &ContentUnit, kind: UnitKind, from: u32) -> Option<usize> {
    match kind {
        UnitKind::Surah => unit.ayahs.iter().position(|a| a.number_in_surah == from),
        UnitKind::Juz => unit.position_of(from),
    }
}

/// Index to start printing from, or `None` while a resume offer is
/// pending.
async fn resume_position(
    ctx: &AppContext,
    unit: &ContentUnit,
    mode: ModeKey,
    auto: bool,
    highlight: Option<u32>,
) -> Option<usize> {
    let (mut coordinator, mut actions) = ctx.resume_coordinator(mode);
    let mut start = Some(0);

    match coordinator.enter(auto, highlight).await {
        ResumeDecision::Prompt { offset } => {
            println!(
                "You stopped {:.0}px into this {}. Run again with --resume to continue there.",
                offset, mode.kind
            );
            coordinator.answer(false);
            start = None;
        }
        ResumeDecision::AutoRestore { offset } => {
            while let Some(action) = actions.recv().await {
                match action {
                    ResumeAction::ScrollTo(_) => {
                        println!("Resuming at {:.0}px", offset);
                        if highlight.is_none() {
                            break;
                        }
                    }
                    ResumeAction::Highlight(verse) => {
                        start = Some(unit.position_of(verse).unwrap_or(0));
                        break;
                    }
                    ResumeAction::ClearHighlight => break,
                }
            }
        }
        ResumeDecision::Idle | ResumeDecision::AlreadyOffered => {}
    }

    coordinator.close();
    start
}

async fn unit_name(ctx: &AppContext, kind: UnitKind, number: u16) -> String {
    if kind == UnitKind::Juz {
        return format!("Juz {}", number);
    }

    ctx.cache
        .surah_list()
        .await
        .and_then(|surahs| surahs.into_iter().find(|s| s.number == number))
        .map(|s| s.name)
        .unwrap_or_else(|| format!("Surah {}", number))
}

pub async fn show_last_read(ctx: &AppContext) -> Result<()> {
    let Some(last_read) = ctx.progress.last_read().await else {
        println!("Nothing read yet");
        return Ok(());
    };

    let position = match last_read.mode {
        ReadingMode::Surah => format!("surah {}", last_read.number.unwrap_or_default()),
        ReadingMode::Juz => format!("juz {}", last_read.juz.unwrap_or_default()),
    };
    let when = chrono::DateTime::from_timestamp_millis(last_read.time)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());

    println!("{} ({})", last_read.name, position);
    if let Some(verse) = last_read.verse {
        println!("  Ayah: {}", verse);
    }
    println!("  Read: {}", when);
    Ok(())
}

pub async fn khatmah_status(ctx: &AppContext) -> Result<()> {
    let completion = ctx.progress.completion().await;

    println!(
        "Khatmah: {}/{} surahs ({}%), {} remaining",
        completion.completed_count(),
        crate::domain::quran::TOTAL_SURAHS,
        completion.percent(),
        completion.remaining()
    );

    let done: Vec<String> = completion.iter().map(|n| n.to_string()).collect();
    if !done.is_empty() {
        println!("  Completed: {}", done.join(", "));
    }
    Ok(())
}

pub async fn khatmah_toggle(ctx: &AppContext, surah: u16) -> Result<()> {
    let completion = ctx.progress.toggle_completion(surah).await?;
    let state = if completion.is_completed(surah) {
        "complete"
    } else {
        "not complete"
    };
    println!(
        "Surah {} marked {} ({}%)",
        surah,
        state,
        completion.percent()
    );
    Ok(())
}

pub async fn khatmah_reset(ctx: &AppContext) -> Result<()> {
    ctx.progress.reset_completion().await;
    println!("Khatmah progress cleared");
    Ok(())
}

pub async fn azkar(ctx: &AppContext, category: Option<&str>, count: bool) -> Result<()> {
    let categories = load_azkar(ctx).await?;

    let Some(query) = category else {
        for category in &categories {
            println!("{} ({} items)", category.category_name, category.items.len());
        }
        return Ok(());
    };

    let category = search_azkar(&categories, query)
        .into_iter()
        .next()
        .ok_or_else(|| TilawaError::Other(format!("No Azkar category matches \"{}\"", query)))?;

    if count {
        return count_azkar(category).await;
    }

    println!("{}", category.category_name);
    for (i, item) in category.items.iter().enumerate() {
        println!();
        println!("{}. {} (x{})", i + 1, item.content, item.target());
        if !item.description.is_empty() {
            println!("   {}", item.description);
        }
        if !item.reference.is_empty() {
            println!("   [{}]", item.reference);
        }
    }
    Ok(())
}

async fn count_azkar(category: &AzkarCategory) -> Result<()> {
    println!("{}", category.category_name);
    println!("Enter counts one, r resets the item, n skips, q quits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = AzkarSession::new();
    let total = category.items.len();

    for (index, item) in category.items.iter().enumerate() {
        let target = item.target();
        println!();
        println!("[{}/{}] {}", index + 1, total, item.content);

        while !session.is_done(index, target) {
            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            match line.trim() {
                "" => {
                    let n = session.increment(index, target);
                    println!("  {}/{}", n, target);
                }
                "r" => {
                    session.reset_item(index);
                    println!("  0/{}", target);
                }
                "n" => break,
                "q" => return Ok(()),
                other => println!("  Unknown input: {}", other),
            }
        }
    }

    println!();
    println!("Done");
    Ok(())
}

pub async fn show_settings(ctx: &AppContext) -> Result<()> {
    print_settings(&ctx.settings.load_settings().await);
    Ok(())
}

pub async fn set_setting(ctx: &AppContext, key: &str, value: &str) -> Result<()> {
    let update = SettingUpdate::parse(key, value)?;
    let (settings, outcome) = ctx.settings.update_setting(update).await;

    match outcome {
        Some(BrightnessOutcome::System) => println!("Applied to the system backlight"),
        Some(BrightnessOutcome::Window) => println!("Applied to this window"),
        Some(BrightnessOutcome::Unavailable) => {
            println!("Saved (no brightness control available)")
        }
        None => {}
    }

    print_settings(&settings);
    Ok(())
}

pub async fn reset_settings(ctx: &AppContext) -> Result<()> {
    let settings = ctx.settings.reset_settings().await;
    println!("Settings restored to defaults");
    print_settings(&settings);
    Ok(())
}

pub async fn theme(ctx: &AppContext, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            ctx.settings.set_theme(name).await;
            println!("Theme set to {}", name);
        }
        None => println!("{}", ctx.settings.theme().await),
    }
    Ok(())
}

pub async fn download(ctx: &AppContext, kind: UnitKind) -> Result<()> {
    println!("Downloading every {} for offline reading...", kind);

    ctx.cache.preload_reference_list(ReferenceKind::Surahs).await;
    ctx.cache.preload_reference_list(ReferenceKind::Azkar).await;

    let report = ctx.downloader.download_all(ctx.cache.clone(), kind).await;

    for (number, e) in &report.failed {
        eprintln!("  Error downloading {} {}: {}", kind, number, e);
    }

    let ayahs: usize = report.downloaded.iter().map(|(_, count)| count).sum();
    println!(
        "Download complete: {} new ({} ayahs), {} already offline, {} errors",
        report.downloaded.len(),
        ayahs,
        report.skipped,
        report.failed.len()
    );
    Ok(())
}

pub async fn show_cached(ctx: &AppContext) -> Result<()> {
    for kind in [UnitKind::Surah, UnitKind::Juz] {
        let cached = ctx.cache.cached_unit_numbers(kind).await;
        println!("{}: {}/{} offline", kind, cached.len(), kind.max());
    }

    for (label, kind) in [
        ("Surah list", ReferenceKind::Surahs),
        ("Azkar", ReferenceKind::Azkar),
    ] {
        let state = if ctx.cache.get_reference_list(kind).await.is_some() {
            "offline"
        } else {
            "not downloaded"
        };
        println!("{}: {}", label, state);
    }
    Ok(())
}

pub async fn wipe(ctx: &AppContext, confirmed: bool) -> Result<()> {
    if !confirmed {
        println!("This erases reading progress, Khatmah and settings.");
        println!("Downloaded content is kept. Re-run with --yes to continue.");
        return Ok(());
    }

    ctx.wipe_user_data().await?;
    println!("User data erased");
    Ok(())
}

async fn load_surahs(ctx: &AppContext) -> Result<Vec<SurahSummary>> {
    ctx.cache.surah_list().await.ok_or_else(|| {
        TilawaError::Other("Surah list unavailable. Check your connection and try again.".into())
    })
}

async fn load_azkar(ctx: &AppContext) -> Result<Vec<AzkarCategory>> {
    ctx.cache.azkar_categories().await.ok_or_else(|| {
        TilawaError::Other("Azkar unavailable. Check your connection and try again.".into())
    })
}

fn print_surah(surah: &SurahSummary, completed: bool) {
    let mark = if completed { "x" } else { " " };
    println!(
        "[{}] {:>3}. {} ({}, {} ayahs)",
        mark,
        surah.number,
        surah.name,
        surah.english_name,
        surah.number_of_ayahs.unwrap_or_default()
    );
}

fn print_settings(settings: &Settings) {
    println!("fontSize:       {} (x{:.2})", settings.font_size, settings.font_size.scale());
    println!("autoAdvance:    {}", settings.auto_advance);
    println!("keepScreenOn:   {}", settings.keep_screen_on);
    println!("hapticFeedback: {}", settings.haptic_feedback);
    println!("brightness:     {:.0}%", settings.brightness * 100.0);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::config::Config;
    use crate::test_support::{RecordingBrightness, StaticFetcher};

    fn context(brightness: Arc<RecordingBrightness>) -> AppContext {
        AppContext::in_memory(Arc::new(StaticFetcher::new()), brightness, Config::default())
            .unwrap()
    }

    async fn saved_verse(ctx: &AppContext) -> Option<u32> {
        ctx.progress.last_read().await.and_then(|lr| lr.verse)
    }

    async fn seed_surah_two(ctx: &AppContext) {
        let ayahs = (8..=17u32)
            .map(|n| json!({ "number": n, "numberInSurah": n - 7, "text": "…" }))
            .collect();
        ctx.cache
            .save_unit(UnitKind::Surah, 2, &Value::Array(ayahs))
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_after_prompt_returns_to_saved_verse() {
        let ctx = context(Arc::new(RecordingBrightness::default()));
        seed_surah_two(&ctx).await;

        // (600 + 150) / 1000 * 10 ayahs -> index 7 -> ayah 15
        let scrolled = ReadOptions {
            scroll: Some(600.0),
            height: Some(1000.0),
            ..Default::default()
        };
        read_unit(&ctx, UnitKind::Surah, 2, scrolled).await.unwrap();
        assert_eq!(saved_verse(&ctx).await, Some(15));

        // Saved offset exists: the reader is only offered a resume
        read_unit(&ctx, UnitKind::Surah, 2, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(saved_verse(&ctx).await, Some(15));

        let resume = ReadOptions {
            resume: true,
            ..Default::default()
        };
        read_unit(&ctx, UnitKind::Surah, 2, resume).await.unwrap();
        assert_eq!(saved_verse(&ctx).await, Some(15));
    }

    #[tokio::test]
    async fn test_read_from_explicit_ayah_records_it() {
        let ctx = context(Arc::new(RecordingBrightness::default()));
        seed_surah_two(&ctx).await;

        let from = ReadOptions {
            from: Some(4),
            ..Default::default()
        };
        read_unit(&ctx, UnitKind::Surah, 2, from).await.unwrap();
        assert_eq!(saved_verse(&ctx).await, Some(11));

        let missing = ReadOptions {
            from: Some(40),
            ..Default::default()
        };
        assert!(read_unit(&ctx, UnitKind::Surah, 2, missing).await.is_err());
    }

    #[tokio::test]
    async fn test_set_brightness_applies_once() {
        let brightness = Arc::new(RecordingBrightness {
            system_ok: true,
            ..Default::default()
        });
        let ctx = context(brightness.clone());

        set_setting(&ctx, "brightness", "0.4").await.unwrap();

        assert_eq!(*brightness.calls.lock().unwrap(), vec![("system", 0.4)]);
        assert!((ctx.settings.load_settings().await.brightness - 0.4).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_set_other_setting_leaves_brightness_alone() {
        let brightness = Arc::new(RecordingBrightness::default());
        let ctx = context(brightness.clone());

        set_setting(&ctx, "keepScreenOn", "on").await.unwrap();

        assert!(brightness.calls.lock().unwrap().is_empty());
        assert!(ctx.settings.load_settings().await.keep_screen_on);
    }
}
