//! Sleep sound catalogue and the player state the sounds page drives.
//!
//! Looping sounds (noise, nature, heartbeat) play until stopped. Lullabies
//! have a fixed length and the player counts it down once per second,
//! stopping itself at zero.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCategory {
    WhiteNoise,
    Nature,
    Heartbeat,
    Lullabies,
}

impl SoundCategory {
    pub const ALL: [SoundCategory; 4] = [
        SoundCategory::WhiteNoise,
        SoundCategory::Nature,
        SoundCategory::Heartbeat,
        SoundCategory::Lullabies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCategory::WhiteNoise => "white-noise",
            SoundCategory::Nature => "nature",
            SoundCategory::Heartbeat => "heartbeat",
            SoundCategory::Lullabies => "lullabies",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SoundCategory::WhiteNoise => "White Noise",
            SoundCategory::Nature => "Nature",
            SoundCategory::Heartbeat => "Heartbeat",
            SoundCategory::Lullabies => "Lullabies",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SoundCategory::WhiteNoise => "🌊",
            SoundCategory::Nature => "🍃",
            SoundCategory::Heartbeat => "💓",
            SoundCategory::Lullabies => "🎵",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    pub id: &'static str,
    pub name: &'static str,
    /// Served from the app's static `sounds/` directory.
    pub url: &'static str,
    pub category: SoundCategory,
    /// Seconds; `None` loops.
    pub duration_secs: Option<u32>,
}

impl Sound {
    pub fn loops(&self) -> bool {
        self.duration_secs.is_none()
    }

    /// "3min" for timed sounds, "Loop" otherwise.
    pub fn length_label(&self) -> String {
        match self.duration_secs {
            Some(secs) => format!("{}min", secs / 60),
            None => "Loop".to_string(),
        }
    }
}

const fn looping(id: &'static str, name: &'static str, url: &'static str, category: SoundCategory) -> Sound {
    Sound {
        id,
        name,
        url,
        category,
        duration_secs: None,
    }
}

pub static SOUNDS: [Sound; 9] = [
    looping("white-noise", "White Noise", "/sounds/white-noise-1.mp3", SoundCategory::WhiteNoise),
    looping("pink-noise", "Pink Noise", "/sounds/pink.noise.mp3", SoundCategory::WhiteNoise),
    looping("brown-noise", "Brown Noise", "/sounds/brown.noise.mp3", SoundCategory::WhiteNoise),
    looping("rain", "Rain Sounds", "/sounds/rain.sounds.mp3", SoundCategory::Nature),
    looping("ocean-waves", "Ocean Waves", "/sounds/ocean.waves.wav", SoundCategory::Nature),
    looping("forest", "Forest Ambience", "/sounds/forest.ambience.wav", SoundCategory::Nature),
    looping("heartbeat", "Heartbeat", "/sounds/heartbeat.mp3", SoundCategory::Heartbeat),
    Sound {
        id: "twinkle-twinkle",
        name: "Twinkle Twinkle",
        url: "/sounds/twinkle.twinkle.mp3",
        category: SoundCategory::Lullabies,
        duration_secs: Some(180),
    },
    Sound {
        id: "brahms-lullaby",
        name: "Brahms Lullaby",
        url: "/sounds/brahms.lullaby.mp3",
        category: SoundCategory::Lullabies,
        duration_secs: Some(240),
    },
];

pub const SLEEP_SOUND_TIPS: [&str; 5] = [
    "Start with white noise for newborns",
    "Use heartbeat sounds to mimic the womb",
    "Keep volume at a comfortable level (not too loud)",
    "Combine with a consistent bedtime routine",
    "Use lullabies for older babies",
];

/// Sounds in one category, or the whole catalogue for `None`.
pub fn sounds_in(category: Option<SoundCategory>) -> impl Iterator<Item = &'static Sound> {
    SOUNDS
        .iter()
        .filter(move |sound| category.map_or(true, |c| sound.category == c))
}

pub fn find_sound(id: &str) -> Option<&'static Sound> {
    SOUNDS.iter().find(|sound| sound.id == id)
}

pub const DEFAULT_VOLUME: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub current: Option<&'static Sound>,
    pub playing: bool,
    pub volume: f64,
    pub muted: bool,
    /// Countdown for timed sounds.
    pub remaining_secs: Option<u32>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current: None,
            playing: false,
            volume: DEFAULT_VOLUME,
            muted: false,
            remaining_secs: None,
        }
    }
}

impl PlayerState {
    /// Choosing the sound that is already playing stops it; anything else
    /// starts the chosen sound unmuted.
    pub fn choose(&mut self, sound: &'static Sound) {
        if self.is_playing(sound) {
            self.stop();
            return;
        }
        self.current = Some(sound);
        self.playing = true;
        self.muted = false;
        self.remaining_secs = sound.duration_secs;
    }

    pub fn stop(&mut self) {
        self.current = None;
        self.playing = false;
        self.remaining_secs = None;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing && self.current.is_some();
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { DEFAULT_VOLUME };
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Volume handed to the audio element.
    pub fn output_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn is_playing(&self, sound: &Sound) -> bool {
        self.playing && self.current.map_or(false, |current| current.id == sound.id)
    }

    /// One second of playback. Timed sounds stop when the countdown runs out;
    /// paused playback does not count down.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        match self.remaining_secs {
            Some(secs) if secs <= 1 => self.stop(),
            Some(secs) => self.remaining_secs = Some(secs - 1),
            None => {}
        }
    }
}

/// "m:ss".
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(id: &str) -> &'static Sound {
        find_sound(id).unwrap()
    }

    #[test]
    fn test_catalogue_covers_every_category() {
        for category in SoundCategory::ALL {
            assert!(sounds_in(Some(category)).count() > 0, "{:?} is empty", category);
            assert_eq!(SoundCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(sounds_in(None).count(), SOUNDS.len());
        assert_eq!(sounds_in(Some(SoundCategory::WhiteNoise)).count(), 3);
    }

    #[test]
    fn test_only_lullabies_are_timed() {
        for sound in SOUNDS.iter() {
            assert_eq!(sound.loops(), sound.category != SoundCategory::Lullabies, "{}", sound.id);
        }
        assert_eq!(sound("brahms-lullaby").length_label(), "4min");
        assert_eq!(sound("rain").length_label(), "Loop");
    }

    #[test]
    fn test_choosing_the_playing_sound_stops_it() {
        let mut player = PlayerState::default();
        player.choose(sound("rain"));
        assert!(player.is_playing(sound("rain")));

        player.choose(sound("heartbeat"));
        assert!(player.is_playing(sound("heartbeat")));
        assert!(!player.is_playing(sound("rain")));

        player.choose(sound("heartbeat"));
        assert_eq!(player.current, None);
        assert!(!player.playing);
    }

    #[test]
    fn test_choosing_unmutes() {
        let mut player = PlayerState::default();
        player.toggle_mute();
        assert_eq!(player.output_volume(), 0.0);

        player.choose(sound("forest"));
        assert_eq!(player.output_volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn test_timed_sound_counts_down_and_stops() {
        let mut player = PlayerState::default();
        player.choose(sound("twinkle-twinkle"));
        assert_eq!(player.remaining_secs, Some(180));

        player.tick();
        assert_eq!(player.remaining_secs, Some(179));

        player.set_playing(false);
        player.tick();
        assert_eq!(player.remaining_secs, Some(179));

        player.set_playing(true);
        for _ in 0..179 {
            player.tick();
        }
        assert_eq!(player.current, None);
        assert_eq!(player.remaining_secs, None);
    }

    #[test]
    fn test_looping_sound_never_stops_on_tick() {
        let mut player = PlayerState::default();
        player.choose(sound("white-noise"));
        for _ in 0..1000 {
            player.tick();
        }
        assert!(player.is_playing(sound("white-noise")));
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut player = PlayerState::default();
        player.set_volume(1.7);
        assert_eq!(player.volume, 1.0);
        player.set_volume(-0.2);
        assert_eq!(player.volume, 0.0);
        player.set_volume(f64::NAN);
        assert_eq!(player.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_set_playing_needs_a_sound() {
        let mut player = PlayerState::default();
        player.set_playing(true);
        assert!(!player.playing);
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(240), "4:00");
        assert_eq!(format_countdown(65), "1:05");
        assert_eq!(format_countdown(0), "0:00");
    }
}
