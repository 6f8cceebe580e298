/// Chord parameters carried by every pad

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChordQuality {
    #[default]
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 6] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChordQuality::Major => "maj",
            ChordQuality::Minor => "min",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChordExtension {
    #[default]
    None,
    Sixth,
    Ninth,
    Eleventh,
    Thirteenth,
}

impl ChordExtension {
    pub const ALL: [ChordExtension; 5] = [
        ChordExtension::None,
        ChordExtension::Sixth,
        ChordExtension::Ninth,
        ChordExtension::Eleventh,
        ChordExtension::Thirteenth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChordExtension::None => "",
            ChordExtension::Sixth => "6",
            ChordExtension::Ninth => "9",
            ChordExtension::Eleventh => "11",
            ChordExtension::Thirteenth => "13",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voicing {
    #[default]
    Close,
    Wide,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordSpec {
    root: u8,
    octave: u8,
    pub quality: ChordQuality,
    pub extension: ChordExtension,
    inversion: u8,
    pub voicing: Voicing,
    flux: f32,
}

impl Default for ChordSpec {
    fn default() -> Self {
        Self {
            root: 0,
            octave: 3,
            quality: ChordQuality::Major,
            extension: ChordExtension::None,
            inversion: 0,
            voicing: Voicing::Close,
            flux: 0.0,
        }
    }
}

impl ChordSpec {
    pub fn new(root: u8, octave: u8, quality: ChordQuality, extension: ChordExtension) -> Self {
        let mut spec = Self {
            quality,
            extension,
            ..Self::default()
        };
        spec.set_root(root);
        spec.set_octave(octave);
        spec
    }

    /// Pitch class, 0 = C
    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn set_root(&mut self, root: u8) {
        self.root = root.min(11);
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn set_octave(&mut self, octave: u8) {
        self.octave = octave.clamp(1, 6);
    }

    pub fn inversion(&self) -> u8 {
        self.inversion
    }

    pub fn set_inversion(&mut self, inversion: u8) {
        self.inversion = inversion.min(3);
    }

    /// Randomization intensity, 0-100 %
    pub fn flux(&self) -> f32 {
        self.flux
    }

    pub fn set_flux(&mut self, flux: f32) {
        self.flux = if flux.is_finite() { flux.clamp(0.0, 100.0) } else { 0.0 };
    }

    pub fn with_inversion(mut self, inversion: u8) -> Self {
        self.set_inversion(inversion);
        self
    }

    pub fn with_voicing(mut self, voicing: Voicing) -> Self {
        self.voicing = voicing;
        self
    }

    pub fn with_flux(mut self, flux: f32) -> Self {
        self.set_flux(flux);
        self
    }
}
