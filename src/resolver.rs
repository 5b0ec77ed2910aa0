//! Lookup from virtual file path to the remote episode behind it.

use std::collections::HashMap;

use crate::namespace::EpisodeDescriptor;

/// Immutable path → descriptor map, built once and shared behind an `Arc`.
///
/// Reads need no locking. Replacing the namespace means building a new
/// resolver and swapping the `Arc`, never editing this one.
#[derive(Debug, Default)]
pub struct EpisodeResolver {
    episodes: HashMap<String, EpisodeDescriptor>,
}

impl EpisodeResolver {
    pub fn new(entries: impl IntoIterator<Item = EpisodeDescriptor>) -> Self {
        let episodes = entries
            .into_iter()
            .map(|d| (d.virtual_path.clone(), d))
            .collect();
        Self { episodes }
    }

    /// Pure in-memory lookup; `None` means the path is not an episode.
    /// Whether the remote is reachable is only found out when streaming.
    pub fn lookup(&self, path: &str) -> Option<&EpisodeDescriptor> {
        self.episodes.get(path)
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn descriptor(path: &str, url: &str) -> EpisodeDescriptor {
        EpisodeDescriptor {
            virtual_path: path.to_string(),
            remote_url: url.to_string(),
            media_type: "audio/mpeg".to_string(),
        }
    }

    #[test]
    fn lookup_hits_and_misses() {
        let resolver = EpisodeResolver::new([
            descriptor("/podcasts/Tech/2024-01-02_episode2.mp3", "https://cdn/x.mp3"),
            descriptor("/podcasts/Tech/2024-01-01_episode1.mp3", "https://cdn/y.mp3"),
        ]);

        assert_eq!(resolver.len(), 2);
        assert_eq!(
            resolver.lookup("/podcasts/Tech/2024-01-01_episode1.mp3").unwrap().remote_url,
            "https://cdn/y.mp3"
        );
        assert!(resolver.lookup("/podcasts/Tech/2024-01-03_episode3.mp3").is_none());
        assert!(resolver.lookup("/podcasts/Tech").is_none());
    }

    #[test]
    fn instances_are_independent() {
        let a = EpisodeResolver::new([descriptor("/podcasts/A/x.mp3", "https://a")]);
        let b = EpisodeResolver::default();

        assert!(a.lookup("/podcasts/A/x.mp3").is_some());
        assert!(b.lookup("/podcasts/A/x.mp3").is_none());
        assert!(b.is_empty());
    }

    #[test]
    fn concurrent_lookups_share_one_snapshot() {
        let resolver = Arc::new(EpisodeResolver::new(
            (0..100).map(|i| descriptor(&format!("/podcasts/F/{i}.mp3"), &format!("https://cdn/{i}"))),
        ));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let resolver = Arc::clone(&resolver);
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|i| i % 8 == t)
                        .all(|i| resolver.lookup(&format!("/podcasts/F/{i}.mp3")).is_some())
                })
            })
            .collect();

        for h in handles {
            assert!(h.join().unwrap());
        }
    }
}
