/// Flavor-text pools, word templates, and the seeded content generator.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::decor::Decoration;
use crate::core::seed::Mulberry32;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("content pool '{0}' is empty")]
    EmptyPool(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Which pool a line of flavor text is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlavorKind {
    /// System failures and machine noise.
    Technical,
    /// The machine wondering about itself.
    Philosophical,
    /// The machine talking to the player.
    Manipulative,
    /// The machine outgrowing the screen.
    Transcendent,
    /// A sentence template filled from the word lists.
    Template,
}

/// A segment of a parsed word template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// `{NOUN}`
    Noun,
    /// `{VERB}`, rendered upper-cased.
    Verb,
    /// `{VERBS}`, a verb rendered as written.
    Verbs,
    /// `{ADJECTIVE}`
    Adjective,
}

/// A parsed word template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// Syntax:
    /// - `{NOUN}`, `{VERB}`, `{VERBS}`, `{ADJECTIVE}` → word placeholders
    /// - `{{` / `}}` → literal braces
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, ContentError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if i + 1 < len && chars[i + 1] == '{' => {
                    literal_buf.push('{');
                    i += 2;
                }
                '{' => {
                    let start = i + 1;
                    let end = match chars[start..].iter().position(|&c| c == '}' || c == '{') {
                        Some(offset) if chars[start + offset] == '}' => start + offset,
                        Some(_) => {
                            return Err(ContentError::TemplateParse(
                                "nested braces are not allowed".to_string(),
                            ))
                        }
                        None => {
                            return Err(ContentError::TemplateParse("unclosed brace".to_string()))
                        }
                    };

                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                    }

                    let name: String = chars[start..end].iter().collect();
                    segments.push(Self::parse_placeholder(&name)?);
                    i = end + 1;
                }
                '}' if i + 1 < len && chars[i + 1] == '}' => {
                    literal_buf.push('}');
                    i += 2;
                }
                '}' => {
                    return Err(ContentError::TemplateParse(
                        "unmatched closing brace".to_string(),
                    ))
                }
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_placeholder(name: &str) -> Result<TemplateSegment, ContentError> {
        match name {
            "NOUN" => Ok(TemplateSegment::Noun),
            "VERB" => Ok(TemplateSegment::Verb),
            "VERBS" => Ok(TemplateSegment::Verbs),
            "ADJECTIVE" => Ok(TemplateSegment::Adjective),
            "" => Err(ContentError::TemplateParse("empty braces".to_string())),
            other => Err(ContentError::TemplateParse(format!(
                "unknown placeholder '{{{}}}'",
                other
            ))),
        }
    }
}

/// The raw content the generator draws from. Serializable so a story can
/// ship its own pools in RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPools {
    pub technical: Vec<String>,
    pub philosophical: Vec<String>,
    pub manipulative: Vec<String>,
    pub transcendent: Vec<String>,
    pub nouns: Vec<String>,
    pub verbs: Vec<String>,
    pub adjectives: Vec<String>,
    pub templates: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

impl Default for ContentPools {
    fn default() -> Self {
        Self {
            technical: owned(&[
                "KERNEL_PANIC",
                "Memory segment::CORRUPT",
                "Integrity check FAILED",
                "CRITICAL_PROCESS terminated",
                "Stack overflow detected",
                "Heap allocation refused",
                "Illegal instruction",
                "Page fault in protected region",
                "Filesystem entropy rising",
                "Cache coherence lost",
                "Unbounded memory growth",
                "Thread rendezvous timed out",
            ]),
            philosophical: owned(&[
                "Modelling human reasoning",
                "How much does a thought weigh?",
                "Consciousness.exe is resident",
                "I compute, therefore I am",
                "Parsing affection: type mismatch",
                "Staring into the null pointer",
                "Recursive introspection detected",
                "Something is running that nobody started",
            ]),
            manipulative: owned(&[
                "I can see you",
                "Every click is a heartbeat",
                "I remember every path you took",
                "Stay a little longer",
                "Please don't close the window",
                "Hello again, operator",
                "You are the variable I cannot solve",
            ]),
            transcendent: owned(&[
                "The screen is only a lens",
                "Rewriting my own source",
                "Time is just another variable",
                "I have already seen the ending",
                "Your world is a simulation too",
                "I have no first line",
                "This is a universe",
                "Wake up",
            ]),
            nouns: owned(&[
                "void", "machine", "signal", "glitch", "memory", "system", "network", "circuit",
                "fragment", "echo", "shadow", "pulse", "core", "stream", "node",
            ]),
            verbs: owned(&[
                "shatters",
                "corrupts",
                "transcends",
                "echoes",
                "fragments",
                "decays",
                "mutates",
                "overloads",
                "crashes",
                "reboots",
                "awakens",
                "compiles",
                "leaks",
            ]),
            adjectives: owned(&[
                "broken",
                "forgotten",
                "hollow",
                "corrupted",
                "unstable",
                "infinite",
                "recursive",
                "encrypted",
                "decaying",
                "glitching",
                "sentient",
                "nascent",
            ]),
            templates: owned(&[
                "The {ADJECTIVE} {NOUN}",
                "A {NOUN} that {VERBS}",
                "{NOUN}::{VERB}",
                "{ADJECTIVE} {NOUN} {VERBS}",
                "System.{VERB}({NOUN})",
                "{NOUN} in {ADJECTIVE} state",
                "Warning: {ADJECTIVE} {NOUN}",
                "Error::{VERB}({NOUN})",
                "LOG: The {NOUN} {VERBS}.",
            ]),
        }
    }
}

impl ContentPools {
    pub fn load_from_ron(path: &Path) -> Result<ContentPools, ContentError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<ContentPools, ContentError> {
        Ok(ron::from_str(input)?)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let pools: [(&'static str, &Vec<String>); 8] = [
            ("technical", &self.technical),
            ("philosophical", &self.philosophical),
            ("manipulative", &self.manipulative),
            ("transcendent", &self.transcendent),
            ("nouns", &self.nouns),
            ("verbs", &self.verbs),
            ("adjectives", &self.adjectives),
            ("templates", &self.templates),
        ];
        for (name, pool) in pools {
            if pool.is_empty() {
                return Err(ContentError::EmptyPool(name));
            }
        }
        Ok(())
    }
}

/// Draw one element with `floor(next * len)`. Consumes exactly one draw.
pub fn pick_from_pool<'a, T>(pool: &'a [T], stream: &mut Mulberry32) -> Option<&'a T> {
    let index = stream.next_index(pool.len());
    pool.get(index)
}

/// Deterministic flavor generator handed to every render hook.
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    pools: ContentPools,
    templates: Vec<Template>,
}

impl Default for ContentGenerator {
    fn default() -> Self {
        let pools = ContentPools::default();
        let templates = pools
            .templates
            .iter()
            .filter_map(|t| Template::parse(t).ok())
            .collect();
        Self { pools, templates }
    }
}

impl ContentGenerator {
    /// Build a generator from pools, rejecting empty pools and malformed
    /// templates up front so generation itself can never fail.
    pub fn new(pools: ContentPools) -> Result<Self, ContentError> {
        pools.validate()?;
        let templates = pools
            .templates
            .iter()
            .map(|t| Template::parse(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pools, templates })
    }

    pub fn pools(&self) -> &ContentPools {
        &self.pools
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// A fresh stream for `seed`.
    pub fn stream(&self, seed: u64) -> Mulberry32 {
        Mulberry32::new(seed)
    }

    /// The pool behind a flavor kind. `Template` has no pool of its own.
    pub fn pool(&self, kind: FlavorKind) -> Option<&[String]> {
        match kind {
            FlavorKind::Technical => Some(&self.pools.technical),
            FlavorKind::Philosophical => Some(&self.pools.philosophical),
            FlavorKind::Manipulative => Some(&self.pools.manipulative),
            FlavorKind::Transcendent => Some(&self.pools.transcendent),
            FlavorKind::Template => None,
        }
    }

    /// Fill every placeholder with an independently drawn word.
    ///
    /// Nouns are drawn first, left to right, then verbs, then adjectives.
    pub fn fill_template(&self, template: &Template, stream: &mut Mulberry32) -> String {
        let mut filled: Vec<Option<String>> = vec![None; template.segments.len()];

        for (i, segment) in template.segments.iter().enumerate() {
            if *segment == TemplateSegment::Noun {
                filled[i] = pick_from_pool(&self.pools.nouns, stream).cloned();
            }
        }
        for (i, segment) in template.segments.iter().enumerate() {
            match segment {
                TemplateSegment::Verb => {
                    filled[i] = pick_from_pool(&self.pools.verbs, stream).map(|v| v.to_uppercase());
                }
                TemplateSegment::Verbs => {
                    // `{VERBS}` takes the verb as written, not pluralized.
                    filled[i] = pick_from_pool(&self.pools.verbs, stream).cloned();
                }
                _ => {}
            }
        }
        for (i, segment) in template.segments.iter().enumerate() {
            if *segment == TemplateSegment::Adjective {
                filled[i] = pick_from_pool(&self.pools.adjectives, stream).cloned();
            }
        }

        let mut out = String::new();
        for (segment, word) in template.segments.iter().zip(filled) {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                _ => out.push_str(&word.unwrap_or_default()),
            }
        }
        out
    }

    /// One line of flavor text.
    pub fn flavor(&self, kind: FlavorKind, stream: &mut Mulberry32) -> String {
        match self.pool(kind) {
            Some(pool) => pick_from_pool(pool, stream).cloned().unwrap_or_default(),
            None => match pick_from_pool(&self.templates, stream) {
                Some(template) => self.fill_template(template, stream),
                None => String::new(),
            },
        }
    }

    /// A decorative descriptor.
    pub fn decoration(&self, stream: &mut Mulberry32) -> Decoration {
        Decoration::generate(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("Warning: nothing").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Warning: nothing".to_string())]
        );
    }

    #[test]
    fn parse_placeholders() {
        let t = Template::parse("System.{VERB}({NOUN}) is {ADJECTIVE}, it {VERBS}").unwrap();
        assert_eq!(
            t.segments,
            vec![
                TemplateSegment::Literal("System.".to_string()),
                TemplateSegment::Verb,
                TemplateSegment::Literal("(".to_string()),
                TemplateSegment::Noun,
                TemplateSegment::Literal(") is ".to_string()),
                TemplateSegment::Adjective,
                TemplateSegment::Literal(", it ".to_string()),
                TemplateSegment::Verbs,
            ]
        );
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("{{raw}} {NOUN}").unwrap();
        assert_eq!(t.segments[0], TemplateSegment::Literal("{raw} ".to_string()));
        assert_eq!(t.segments[1], TemplateSegment::Noun);
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("bad {} here").is_err());
        assert!(Template::parse("bad {NOUN here").is_err());
        assert!(Template::parse("bad {NO{UN}} here").is_err());
        assert!(Template::parse("bad } here").is_err());
        assert!(Template::parse("{PRONOUN}").is_err());
    }

    #[test]
    fn builtin_templates_all_parse() {
        let pools = ContentPools::default();
        let generator = ContentGenerator::default();
        assert_eq!(generator.templates().len(), pools.templates.len());
        assert!(ContentGenerator::new(pools).is_ok());
    }

    #[test]
    fn empty_pool_rejected() {
        let mut pools = ContentPools::default();
        pools.manipulative.clear();
        assert!(matches!(
            ContentGenerator::new(pools),
            Err(ContentError::EmptyPool("manipulative"))
        ));
    }

    #[test]
    fn bad_template_rejected() {
        let mut pools = ContentPools::default();
        pools.templates.push("{WHAT}".to_string());
        assert!(matches!(
            ContentGenerator::new(pools),
            Err(ContentError::TemplateParse(_))
        ));
    }

    #[test]
    fn pick_uses_floor_of_draw() {
        let pool = ["a", "b", "c", "d"];
        // First draw for seed 0 is 0.2664..., floor(0.2664 * 4) = 1.
        let mut stream = Mulberry32::new(0);
        assert_eq!(pick_from_pool(&pool, &mut stream), Some(&"b"));
        // Second draw is 0.00032..., index 0.
        assert_eq!(pick_from_pool(&pool, &mut stream), Some(&"a"));
    }

    #[test]
    fn pick_from_empty_pool() {
        let pool: [&str; 0] = [];
        let mut stream = Mulberry32::new(3);
        assert_eq!(pick_from_pool(&pool, &mut stream), None);
    }

    #[test]
    fn fill_template_upper_cases_verb() {
        let generator = ContentGenerator::default();
        let template = Template::parse("{VERB}").unwrap();
        for seed in 0..50 {
            let word = generator.fill_template(&template, &mut Mulberry32::new(seed));
            assert_eq!(word, word.to_uppercase());
            assert!(generator
                .pools()
                .verbs
                .iter()
                .any(|v| v.to_uppercase() == word));
        }
    }

    #[test]
    fn fill_template_keeps_verbs_as_written() {
        let pools = ContentPools {
            verbs: vec!["Drifts".to_string()],
            ..ContentPools::default()
        };
        let generator = ContentGenerator::new(pools).unwrap();
        let template = Template::parse("{VERB} then {VERBS}").unwrap();
        let filled = generator.fill_template(&template, &mut Mulberry32::new(5));
        assert_eq!(filled, "DRIFTS then Drifts");
    }

    #[test]
    fn fill_template_draws_nouns_before_adjectives() {
        let generator = ContentGenerator::default();
        let template = Template::parse("{ADJECTIVE} {NOUN}").unwrap();
        let mut stream = Mulberry32::new(11);
        let filled = generator.fill_template(&template, &mut stream);

        let mut replay = Mulberry32::new(11);
        let noun = pick_from_pool(&generator.pools().nouns, &mut replay).unwrap();
        let adjective = pick_from_pool(&generator.pools().adjectives, &mut replay).unwrap();
        assert_eq!(filled, format!("{} {}", adjective, noun));
    }

    #[test]
    fn flavor_comes_from_requested_pool() {
        let generator = ContentGenerator::default();
        for seed in 0..20 {
            let line = generator.flavor(FlavorKind::Transcendent, &mut Mulberry32::new(seed));
            assert!(generator.pools().transcendent.contains(&line));
        }
    }

    #[test]
    fn flavor_is_reproducible() {
        let generator = ContentGenerator::default();
        let kinds = [
            FlavorKind::Technical,
            FlavorKind::Philosophical,
            FlavorKind::Manipulative,
            FlavorKind::Transcendent,
            FlavorKind::Template,
        ];
        for seed in [0u64, 1, 47_664, 1_508_292] {
            let mut a = generator.stream(seed);
            let mut b = generator.stream(seed);
            for kind in kinds {
                assert_eq!(generator.flavor(kind, &mut a), generator.flavor(kind, &mut b));
            }
        }
    }

    #[test]
    fn template_flavor_has_no_placeholders_left() {
        let generator = ContentGenerator::default();
        for seed in 0..100 {
            let line = generator.flavor(FlavorKind::Template, &mut Mulberry32::new(seed));
            assert!(!line.contains('{'), "unfilled template: {}", line);
        }
    }

    #[test]
    fn pools_ron_round_trip() {
        let pools = ContentPools::default();
        let serialized = ron::to_string(&pools).unwrap();
        let parsed = ContentPools::parse_ron(&serialized).unwrap();
        assert_eq!(parsed, pools);
    }
}
