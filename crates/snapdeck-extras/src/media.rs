#![forbid(unsafe_code)]

//! Playlist-driven music player model.
//!
//! The player owns playlist state and transport logic; actual audio goes
//! through an [`AudioSink`] the host provides (an `<audio>` element with an
//! HLS attachment in the browser, a recorder in tests).
//!
//! The player listens for [`Signal::MediaPauseRequest`] on the page bus via
//! [`attach_pause_signal`], so an engaged lockdown silences it.
//! [`LockdownSoundtrack`] plays the lockdown's own looped track in its place.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use snapdeck_core::geometry::ViewportSize;
use snapdeck_core::signal::Signal;
use snapdeck_runtime::bus::{SignalBus, Subscription};
use snapdeck_runtime::lockdown::LockdownDecor;

use crate::rng::XorShift64;

/// Default playlist location.
pub const DEFAULT_PLAYLIST_URL: &str = "https://hls.wenturc.com/playlist.json";

/// Default prefix for track stream paths.
pub const DEFAULT_STREAMING_BASE: &str = "https://hls.wenturc.com";

/// Label when there is no track at all.
pub const UNKNOWN_TRACK: &str = "未知歌曲";
/// Title when none can be inferred.
pub const UNKNOWN_TITLE: &str = "未知标题";
/// Artist when none can be inferred.
pub const UNKNOWN_ARTIST: &str = "未知艺术家";
/// Status line while the playlist is loading.
pub const LOADING_LABEL: &str = "加载中...";
/// Status line after a playlist failure.
pub const LOAD_FAILED_LABEL: &str = "加载播放列表失败";

const AUDIO_EXTENSIONS: [&str; 5] = [".flac", ".mp3", ".wav", ".m4a", ".aac"];

/// Errors from playlist loading and playback.
#[derive(Debug)]
pub enum MediaError {
    /// Playlist body was not valid JSON of the expected shape.
    Playlist(serde_json::Error),
    /// Host could not fetch the playlist.
    Fetch(String),
    /// Sink refused to start playback.
    Playback(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playlist(e) => write!(f, "invalid playlist: {e}"),
            Self::Fetch(msg) => write!(f, "playlist fetch failed: {msg}"),
            Self::Playback(msg) => write!(f, "playback failed: {msg}"),
        }
    }
}

impl std::error::Error for MediaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Playlist(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Playlist(e)
    }
}

/// One playlist entry. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackInfo {
    /// Display title.
    pub title: Option<String>,
    /// Display artist.
    pub artist: Option<String>,
    /// Source file name, often `Artist - Title.ext`.
    pub filename: Option<String>,
    /// Fallback file name.
    pub original_file: Option<String>,
    /// Whether an HLS rendition exists.
    #[serde(rename = "hasHLS")]
    pub has_hls: Option<bool>,
    /// Path of the HLS manifest, relative to the streaming base.
    pub hls_url: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn strip_audio_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    AUDIO_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map_or(name, |ext| &name[..name.len() - ext.len()])
}

impl TrackInfo {
    /// `"{title} - {artist}"`, inferring missing parts from the file name.
    #[must_use]
    pub fn label(&self) -> String {
        let raw = non_empty(self.filename.as_ref())
            .or_else(|| non_empty(self.original_file.as_ref()))
            .unwrap_or("");
        let inferred = strip_audio_extension(raw);
        let mut title = non_empty(self.title.as_ref()).map(str::to_string);
        let mut artist = non_empty(self.artist.as_ref()).map(str::to_string);

        if (title.is_none() || artist.is_none()) && inferred.contains(" - ") {
            let mut parts = inferred.split(" - ");
            let first = parts.next().unwrap_or("");
            let rest = parts.collect::<Vec<_>>().join(" - ");
            if artist.is_none() && !first.is_empty() {
                artist = Some(first.to_string());
            }
            if title.is_none() && !rest.is_empty() {
                title = Some(rest);
            }
        } else if title.is_none() {
            title = Some(if inferred.is_empty() {
                UNKNOWN_TITLE.to_string()
            } else {
                inferred.to_string()
            });
        }

        let artist = artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        match title {
            Some(title) => format!("{title} - {artist}"),
            None => artist,
        }
    }

    /// Full stream URL when the track has an HLS rendition.
    #[must_use]
    pub fn stream_url(&self, base: &str) -> Option<String> {
        match (self.has_hls, non_empty(self.hls_url.as_ref())) {
            (Some(true), Some(path)) => Some(format!("{base}{path}")),
            _ => None,
        }
    }
}

/// Label for an optional track.
#[must_use]
pub fn track_label(track: Option<&TrackInfo>) -> String {
    track.map_or_else(|| UNKNOWN_TRACK.to_string(), TrackInfo::label)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlaylistResponse {
    tracks: Vec<TrackInfo>,
}

/// Parse a playlist response body. A missing `tracks` key is an empty list.
pub fn parse_playlist(body: &str) -> Result<Vec<TrackInfo>, MediaError> {
    let response: PlaylistResponse = serde_json::from_str(body)?;
    Ok(response.tracks)
}

/// `m:ss`, or `0:00` for zero, negative or non-finite input.
#[must_use]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Where the player fetches from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Playlist JSON URL.
    pub playlist_url: String,
    /// Prefix for `hlsUrl` paths.
    pub streaming_base: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            playlist_url: DEFAULT_PLAYLIST_URL.to_string(),
            streaming_base: DEFAULT_STREAMING_BASE.to_string(),
        }
    }
}

/// Audio output driven by the player.
pub trait AudioSink {
    /// Switch to a new stream.
    fn set_source(&mut self, url: &str);
    /// Start or resume playback.
    fn play(&mut self) -> Result<(), MediaError>;
    /// Pause playback.
    fn pause(&mut self);
    /// Volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f64);
    /// Mute or unmute.
    fn set_muted(&mut self, muted: bool);
    /// Jump to a position in seconds.
    fn seek(&mut self, seconds: f64);
    /// Drop the source and any stream attachment.
    fn unload(&mut self);
}

/// Playlist and transport state.
#[derive(Debug)]
pub struct MusicPlayer<S: AudioSink> {
    config: MediaConfig,
    sink: S,
    rng: XorShift64,
    tracks: Vec<TrackInfo>,
    index: usize,
    playing: bool,
    muted: bool,
    volume: u8,
    duration: f64,
    current_time: f64,
    random: bool,
    error: Option<String>,
    loaded_url: Option<String>,
}

impl<S: AudioSink> MusicPlayer<S> {
    /// An empty, paused player at volume 70.
    pub fn new(config: MediaConfig, mut sink: S, seed: u64) -> Self {
        sink.set_volume(0.7);
        Self {
            config,
            sink,
            rng: XorShift64::new(seed),
            tracks: Vec::new(),
            index: 0,
            playing: false,
            muted: false,
            volume: 70,
            duration: 0.0,
            current_time: 0.0,
            random: false,
            error: None,
            loaded_url: None,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// The audio sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Install a fetched playlist body and jump to a random track.
    pub fn load_playlist(&mut self, body: &str) -> Result<usize, MediaError> {
        match parse_playlist(body) {
            Ok(tracks) => {
                self.tracks = tracks;
                self.error = None;
                if !self.tracks.is_empty() {
                    self.index = self.rng.below(self.tracks.len());
                }
                snapdeck_core::info!(tracks = self.tracks.len(), "playlist loaded");
                self.load_current();
                Ok(self.tracks.len())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Record a playlist failure reported by the host.
    pub fn fail(&mut self, error: &MediaError) {
        snapdeck_core::warn!(%error, "playlist unavailable");
        self.error = Some(error.to_string());
    }

    /// Loaded tracks.
    #[must_use]
    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    /// Index of the current track.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Current track, if the playlist is non-empty.
    #[must_use]
    pub fn current_track(&self) -> Option<&TrackInfo> {
        self.tracks.get(self.index)
    }

    /// Display label of the current track.
    #[must_use]
    pub fn label(&self) -> String {
        track_label(self.current_track())
    }

    /// Stream URL of the current track.
    #[must_use]
    pub fn stream_url(&self) -> Option<String> {
        self.current_track()
            .and_then(|t| t.stream_url(&self.config.streaming_base))
    }

    /// Secondary line: error, loading, or `第 i/n 首`.
    #[must_use]
    pub fn status_line(&self) -> String {
        if self.error.is_some() {
            LOAD_FAILED_LABEL.to_string()
        } else if self.tracks.is_empty() {
            LOADING_LABEL.to_string()
        } else {
            format!("第 {}/{} 首", self.index + 1, self.tracks.len())
        }
    }

    /// Last load error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether audio is playing.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether output is muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume in `0..=100`.
    #[must_use]
    pub const fn volume(&self) -> u8 {
        self.volume
    }

    /// Whether next/prev pick random tracks.
    #[must_use]
    pub const fn is_random(&self) -> bool {
        self.random
    }

    /// Playback position in seconds.
    #[must_use]
    pub const fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Track length in seconds; 0 until metadata arrives.
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Position as a percentage.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration * 100.0
        } else {
            0.0
        }
    }

    fn load_current(&mut self) {
        let Some(url) = self.stream_url() else {
            return;
        };
        if self.loaded_url.as_deref() != Some(url.as_str()) {
            snapdeck_core::debug!(%url, "switching stream");
            self.sink.set_source(&url);
            self.loaded_url = Some(url);
        }
        if self.playing {
            self.start();
        }
    }

    fn start(&mut self) {
        match self.sink.play() {
            Ok(()) => self.playing = true,
            Err(error) => {
                snapdeck_core::debug!(%error, "play rejected");
                self.playing = false;
            }
        }
    }

    /// Play or pause. Does nothing without a playable track.
    pub fn toggle_play(&mut self) {
        if self.stream_url().is_none() {
            return;
        }
        if self.playing {
            self.pause();
        } else {
            if self.loaded_url.is_none() {
                self.load_current();
            }
            self.start();
        }
    }

    /// Pause playback.
    pub fn pause(&mut self) {
        self.sink.pause();
        self.playing = false;
    }

    fn random_index(&mut self, exclude: usize) -> usize {
        let n = self.tracks.len();
        if n <= 1 {
            return 0;
        }
        let pick = self.rng.below(n - 1);
        if pick >= exclude { pick + 1 } else { pick }
    }

    fn go_to(&mut self, index: usize) {
        self.index = index;
        self.current_time = 0.0;
        self.load_current();
    }

    /// Advance to the next track.
    pub fn next(&mut self) {
        let n = self.tracks.len();
        if n == 0 {
            return;
        }
        let index = if self.random {
            self.random_index(self.index)
        } else {
            (self.index + 1) % n
        };
        self.go_to(index);
    }

    /// Go back to the previous track.
    pub fn prev(&mut self) {
        let n = self.tracks.len();
        if n == 0 {
            return;
        }
        let index = if self.random {
            self.random_index(self.index)
        } else {
            (self.index + n - 1) % n
        };
        self.go_to(index);
    }

    /// Flip shuffle mode.
    pub fn toggle_random(&mut self) {
        self.random = !self.random;
    }

    /// Flip mute.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.sink.set_muted(self.muted);
    }

    /// Set volume (clamped to 100). Unmutes.
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        self.sink.set_volume(f64::from(self.volume) / 100.0);
        if self.muted {
            self.muted = false;
            self.sink.set_muted(false);
        }
    }

    /// Seek to fraction `p` of the track. Ignored before metadata.
    pub fn seek(&mut self, p: f64) {
        if self.duration <= 0.0 || p.is_nan() {
            return;
        }
        let t = p.clamp(0.0, 1.0) * self.duration;
        self.sink.seek(t);
        self.current_time = t;
    }

    /// `timeupdate` from the sink.
    pub fn on_time_update(&mut self, seconds: f64) {
        self.current_time = if seconds.is_finite() { seconds } else { 0.0 };
    }

    /// `loadedmetadata` from the sink.
    pub fn on_metadata(&mut self, duration: f64) {
        self.duration = if duration.is_finite() { duration } else { 0.0 };
    }

    /// `ended` from the sink.
    pub fn on_ended(&mut self) {
        self.next();
    }
}

/// Pause `player` whenever the bus carries [`Signal::MediaPauseRequest`].
#[must_use = "dropping the Subscription stops pause delivery"]
pub fn attach_pause_signal<S: AudioSink + 'static>(
    player: &Rc<RefCell<MusicPlayer<S>>>,
    bus: &SignalBus,
) -> Subscription {
    let weak = Rc::downgrade(player);
    bus.on(Signal::MediaPauseRequest, move || {
        let Some(player) = weak.upgrade() else {
            return;
        };
        match player.try_borrow_mut() {
            Ok(mut p) => p.pause(),
            Err(_) => {
                snapdeck_core::warn!("player busy; pause request dropped");
            }
        }
    })
}

/// Track looped while the lockdown is engaged.
pub const LOCKDOWN_TRACK_URL: &str =
    "https://hls.wenturc.com/music-hls/Laur-null-feat/playlist.m3u8";

/// Where the lockdown soundtrack stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundtrackState {
    /// Not engaged, no source loaded.
    #[default]
    Silent,
    /// Playing with sound.
    Playing,
    /// Autoplay was refused with sound; playing muted instead.
    PlayingMuted,
    /// Even muted playback was refused.
    Blocked,
}

/// Looped background track for the lockdown.
///
/// Installed as (part of) the page's [`LockdownDecor`]: `show` loads the
/// track and attempts autoplay, `hide` pauses and unloads it. A refused
/// autoplay is retried once muted. Sinks that learn about a refusal
/// asynchronously report it through [`play_rejected`](Self::play_rejected).
#[derive(Debug)]
pub struct LockdownSoundtrack<S: AudioSink> {
    url: String,
    sink: S,
    state: SoundtrackState,
    engaged: bool,
    muted: bool,
}

impl<S: AudioSink> LockdownSoundtrack<S> {
    /// A soundtrack for [`LOCKDOWN_TRACK_URL`].
    pub fn new(sink: S) -> Self {
        Self::with_url(LOCKDOWN_TRACK_URL, sink)
    }

    /// A soundtrack for another stream.
    pub fn with_url(url: impl Into<String>, sink: S) -> Self {
        Self {
            url: url.into(),
            sink,
            state: SoundtrackState::Silent,
            engaged: false,
            muted: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SoundtrackState {
        self.state
    }

    /// Whether the lockdown currently owns the track.
    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// The sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Load the track and try to start it with sound.
    pub fn engage(&mut self) {
        if self.engaged {
            return;
        }
        self.engaged = true;
        if self.muted {
            self.muted = false;
            self.sink.set_muted(false);
        }
        self.sink.set_source(&self.url);
        snapdeck_core::info!(url = %self.url, "lockdown soundtrack engaged");
        self.attempt();
    }

    fn attempt(&mut self) {
        match self.sink.play() {
            Ok(()) => {
                self.state = if self.muted {
                    SoundtrackState::PlayingMuted
                } else {
                    SoundtrackState::Playing
                };
            }
            Err(error) => self.refused(&error),
        }
    }

    fn refused(&mut self, error: &MediaError) {
        if self.muted {
            snapdeck_core::debug!(%error, "muted autoplay refused");
            self.state = SoundtrackState::Blocked;
            return;
        }
        snapdeck_core::debug!(%error, "autoplay refused; retrying muted");
        self.muted = true;
        self.sink.set_muted(true);
        self.attempt();
    }

    /// The sink reported a refused `play()` after the fact.
    pub fn play_rejected(&mut self, error: &MediaError) {
        if self.engaged {
            self.refused(error);
        }
    }

    /// `ended` from the sink: loop from the start.
    pub fn on_ended(&mut self) {
        if !self.engaged {
            return;
        }
        self.sink.seek(0.0);
        if let Err(error) = self.sink.play() {
            snapdeck_core::debug!(%error, "soundtrack restart refused");
        }
    }

    /// Pause and unload the track.
    pub fn release(&mut self) {
        if !self.engaged {
            return;
        }
        self.engaged = false;
        self.sink.pause();
        self.sink.unload();
        self.state = SoundtrackState::Silent;
        snapdeck_core::info!("lockdown soundtrack released");
    }
}

impl<S: AudioSink> LockdownDecor for LockdownSoundtrack<S> {
    fn show(&mut self, _viewport: ViewportSize) {
        self.engage();
    }

    fn hide(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        sources: Vec<String>,
        plays: u32,
        pauses: u32,
        volume: f64,
        muted: bool,
        seeks: Vec<f64>,
        refuse: bool,
        refuse_audible: bool,
    }

    impl AudioSink for Recorder {
        fn set_source(&mut self, url: &str) {
            self.sources.push(url.to_string());
        }
        fn play(&mut self) -> Result<(), MediaError> {
            if self.refuse || (self.refuse_audible && !self.muted) {
                return Err(MediaError::Playback("NotAllowedError".into()));
            }
            self.plays += 1;
            Ok(())
        }
        fn pause(&mut self) {
            self.pauses += 1;
        }
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
        fn seek(&mut self, seconds: f64) {
            self.seeks.push(seconds);
        }
        fn unload(&mut self) {
            self.sources.clear();
        }
    }

    fn track(filename: &str) -> TrackInfo {
        TrackInfo {
            filename: Some(filename.to_string()),
            ..TrackInfo::default()
        }
    }

    const PLAYLIST: &str = r#"{"tracks":[
        {"filename":"A - One.flac","hasHLS":true,"hlsUrl":"/a.m3u8"},
        {"filename":"B - Two.mp3","hasHLS":true,"hlsUrl":"/b.m3u8"},
        {"filename":"C - Three.wav","hasHLS":true,"hlsUrl":"/c.m3u8"}
    ]}"#;

    fn loaded() -> MusicPlayer<Recorder> {
        let mut p = MusicPlayer::new(MediaConfig::default(), Recorder::default(), 4);
        assert_eq!(p.load_playlist(PLAYLIST).expect("valid"), 3);
        p
    }

    #[test]
    fn labels_infer_from_filename() {
        assert_eq!(track_label(None), "未知歌曲");
        assert_eq!(track(r"Artist - Song.FLAC").label(), "Song - Artist");
        assert_eq!(track("A - B - C.m4a").label(), "B - C - A");
        assert_eq!(track("plain.aac").label(), "plain - 未知艺术家");
        assert_eq!(TrackInfo::default().label(), "未知标题 - 未知艺术家");
        let named = TrackInfo {
            title: Some("Given".into()),
            artist: Some("Someone".into()),
            filename: Some("X - Y.mp3".into()),
            ..TrackInfo::default()
        };
        assert_eq!(named.label(), "Given - Someone");
        let fallback = TrackInfo {
            original_file: Some("Solo - Piece.ogg".into()),
            title: Some("Piece".into()),
            ..TrackInfo::default()
        };
        assert_eq!(fallback.label(), "Piece - Solo");
    }

    #[test]
    fn stream_url_needs_flag_and_path() {
        let mut t = track("x.mp3");
        assert_eq!(t.stream_url("https://h"), None);
        t.hls_url = Some("/x.m3u8".into());
        assert_eq!(t.stream_url("https://h"), None);
        t.has_hls = Some(true);
        assert_eq!(t.stream_url("https://h").as_deref(), Some("https://h/x.m3u8"));
    }

    #[test]
    fn format_time_cases() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(5.9), "0:05");
        assert_eq!(format_time(125.0), "2:05");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn playlist_shapes() {
        assert!(parse_playlist("{}").expect("empty").is_empty());
        assert!(matches!(parse_playlist("[1]"), Err(MediaError::Playlist(_))));
    }

    #[test]
    fn status_line_tracks_load_state() {
        let mut p = MusicPlayer::new(MediaConfig::default(), Recorder::default(), 1);
        assert_eq!(p.status_line(), "加载中...");
        assert!(p.load_playlist("not json").is_err());
        assert_eq!(p.status_line(), "加载播放列表失败");
        assert!(p.error().is_some());

        let p = loaded();
        assert_eq!(p.status_line(), format!("第 {}/3 首", p.index() + 1));
        assert_eq!(p.sink().sources.len(), 1);
    }

    #[test]
    fn sequential_navigation_wraps() {
        let mut p = loaded();
        let start = p.index();
        p.next();
        assert_eq!(p.index(), (start + 1) % 3);
        p.prev();
        p.prev();
        assert_eq!(p.index(), (start + 2) % 3);
    }

    #[test]
    fn random_never_repeats() {
        let mut p = loaded();
        p.toggle_random();
        for _ in 0..50 {
            let before = p.index();
            p.next();
            assert_ne!(p.index(), before);
            assert!(p.index() < 3);
        }
    }

    #[test]
    fn play_pause_and_refusal() {
        let mut p = loaded();
        p.toggle_play();
        assert!(p.is_playing());
        p.next();
        assert_eq!(p.sink().plays, 2, "track change keeps playing");
        p.toggle_play();
        assert!(!p.is_playing());

        let mut refused = MusicPlayer::new(
            MediaConfig::default(),
            Recorder {
                refuse: true,
                ..Recorder::default()
            },
            2,
        );
        refused.load_playlist(PLAYLIST).expect("valid");
        refused.toggle_play();
        assert!(!refused.is_playing());
    }

    #[test]
    fn volume_seek_and_progress() {
        let mut p = loaded();
        p.toggle_mute();
        assert!(p.is_muted());
        p.set_volume(150);
        assert_eq!(p.volume(), 100);
        assert!(!p.is_muted());

        p.seek(0.5);
        assert!(p.sink().seeks.is_empty());
        p.on_metadata(200.0);
        p.seek(1.5);
        assert_eq!(p.current_time(), 200.0);
        p.on_time_update(50.0);
        assert_eq!(p.progress(), 25.0);
        p.on_metadata(f64::NAN);
        assert_eq!(p.progress(), 0.0);
    }

    #[test]
    fn pause_signal_pauses() {
        let bus = SignalBus::new();
        let player = Rc::new(RefCell::new(loaded()));
        let _sub = attach_pause_signal(&player, &bus);
        player.borrow_mut().toggle_play();
        assert_eq!(bus.publish(Signal::MediaPauseRequest), 1);
        assert!(!player.borrow().is_playing());
        assert_eq!(bus.publish(Signal::LockdownEnable), 0);
    }

    fn soundtrack(recorder: Recorder) -> LockdownSoundtrack<Recorder> {
        LockdownSoundtrack::with_url("https://h/lock.m3u8", recorder)
    }

    #[test]
    fn soundtrack_plays_audibly_when_allowed() {
        let mut s = soundtrack(Recorder::default());
        assert_eq!(s.state(), SoundtrackState::Silent);
        s.show(ViewportSize::new(1280.0, 720.0));
        assert!(s.is_engaged());
        assert_eq!(s.state(), SoundtrackState::Playing);
        assert_eq!(s.sink().sources, ["https://h/lock.m3u8"]);
        assert_eq!(s.sink().plays, 1);
        assert!(!s.sink().muted);
    }

    #[test]
    fn refused_autoplay_retries_muted() {
        let mut s = soundtrack(Recorder {
            refuse_audible: true,
            ..Recorder::default()
        });
        s.engage();
        assert_eq!(s.state(), SoundtrackState::PlayingMuted);
        assert!(s.sink().muted);
        assert_eq!(s.sink().plays, 1);

        let mut blocked = soundtrack(Recorder {
            refuse: true,
            ..Recorder::default()
        });
        blocked.engage();
        assert_eq!(blocked.state(), SoundtrackState::Blocked);
        assert!(blocked.sink().muted);
    }

    #[test]
    fn late_rejection_retries_muted_once() {
        let mut s = soundtrack(Recorder::default());
        let refusal = MediaError::Playback("NotAllowedError".into());
        s.play_rejected(&refusal);
        assert_eq!(s.state(), SoundtrackState::Silent, "ignored while released");

        s.engage();
        s.play_rejected(&refusal);
        assert_eq!(s.state(), SoundtrackState::PlayingMuted);
        assert_eq!(s.sink().plays, 2);
        s.play_rejected(&refusal);
        assert_eq!(s.state(), SoundtrackState::Blocked);
        assert_eq!(s.sink().plays, 2);
    }

    #[test]
    fn ended_track_loops_from_start() {
        let mut s = soundtrack(Recorder::default());
        s.on_ended();
        assert!(s.sink().seeks.is_empty());
        s.engage();
        s.on_ended();
        assert_eq!(s.sink().seeks, [0.0]);
        assert_eq!(s.sink().plays, 2);
    }

    #[test]
    fn release_pauses_and_unloads() {
        let mut s = soundtrack(Recorder {
            refuse_audible: true,
            ..Recorder::default()
        });
        s.show(ViewportSize::new(390.0, 844.0));
        s.hide();
        assert!(!s.is_engaged());
        assert_eq!(s.state(), SoundtrackState::Silent);
        assert_eq!(s.sink().pauses, 1);
        assert!(s.sink().sources.is_empty());

        s.hide();
        assert_eq!(s.sink().pauses, 1, "release is idempotent");

        s.engage();
        assert_eq!(s.state(), SoundtrackState::PlayingMuted);
        assert_eq!(s.sink().plays, 2);
        assert_eq!(s.sink().sources.len(), 1);
    }
}
