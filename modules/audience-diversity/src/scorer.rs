//! Two-tier audience diversity scoring.
//!
//! For each post in a batch:
//! 1. Extract one candidate URL, unshorten it, and look its registrable domain
//!    up in the domain table.
//! 2. If that fails, classify the post's URL-stripped text and look the topic
//!    up in the topic table.
//! 3. If that fails too, use the default score.
//!
//! Subsets of the batch travel through the unshortener and the topic model
//! alongside the indices of the posts they came from, so every result lands
//! back in its post's slot.
//!
//! Per-post misses are ordinary branches. Anything else (classifier failure,
//! a collaborator returning the wrong number of results, a topic missing from
//! the table) fails the whole call; the lenient entry points then fall back to
//! the default score for every post.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::context::DiversityContext;
use crate::error::ScoringError;
use crate::text::{post_text, usable_text};
use crate::traits::{TopicClassifier, Unshortener};
use crate::types::{Platform, Post, PostScore, ScoreSource, NO_TOPIC};
use crate::urls::{candidate_url, registrable_domain};

#[derive(Debug, Clone)]
enum PostState {
    Unresolved,
    Resolved(PostScore),
}

pub struct DiversityScorer {
    context: Arc<DiversityContext>,
    unshortener: Arc<dyn Unshortener>,
    classifier: Arc<dyn TopicClassifier>,
}

impl DiversityScorer {
    pub fn new(
        context: Arc<DiversityContext>,
        unshortener: Arc<dyn Unshortener>,
        classifier: Arc<dyn TopicClassifier>,
    ) -> Self {
        Self {
            context,
            unshortener,
            classifier,
        }
    }

    pub fn context(&self) -> &DiversityContext {
        &self.context
    }

    /// Score a batch. Always returns one score per post, in input order; if
    /// the batch fails as a whole every post gets the default score.
    pub async fn score_batch(&self, posts: &[Post], platform: Platform) -> Vec<f64> {
        self.score_batch_with_sources(posts, platform)
            .await
            .into_iter()
            .map(|s| s.score)
            .collect()
    }

    /// Lenient counterpart of [`Self::score_batch_detailed`]. Errors and
    /// collaborator panics are logged and the whole batch gets
    /// [`Self::fallback_scores`].
    pub async fn score_batch_with_sources(&self, posts: &[Post], platform: Platform) -> Vec<PostScore> {
        let outcome = AssertUnwindSafe(self.score_batch_detailed(posts, platform))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(scores)) => scores,
            Ok(Err(e)) => {
                error!(error = %e, posts = posts.len(), %platform, "Scoring failed, using default for whole batch");
                self.fallback_scores(posts.len())
            }
            Err(payload) => {
                error!(
                    panic = panic_message(payload.as_ref()),
                    posts = posts.len(),
                    %platform,
                    "Scoring panicked, using default for whole batch"
                );
                self.fallback_scores(posts.len())
            }
        }
    }

    /// Score one post. Same pipeline as a batch of one.
    pub async fn score_single(&self, post: &Post, platform: Platform) -> f64 {
        self.score_batch(std::slice::from_ref(post), platform)
            .await
            .into_iter()
            .next()
            .unwrap_or(self.context.normalization.default_score)
    }

    pub async fn try_score_batch(
        &self,
        posts: &[Post],
        platform: Platform,
    ) -> Result<Vec<f64>, ScoringError> {
        Ok(self
            .score_batch_detailed(posts, platform)
            .await?
            .into_iter()
            .map(|s| s.score)
            .collect())
    }

    pub async fn try_score_single(&self, post: &Post, platform: Platform) -> Result<f64, ScoringError> {
        let scores = self.try_score_batch(std::slice::from_ref(post), platform).await?;
        Ok(scores
            .into_iter()
            .next()
            .unwrap_or(self.context.normalization.default_score))
    }

    /// Score a batch and report where each score came from.
    pub async fn score_batch_detailed(
        &self,
        posts: &[Post],
        platform: Platform,
    ) -> Result<Vec<PostScore>, ScoringError> {
        let mut states = vec![PostState::Unresolved; posts.len()];

        self.resolve_domains(posts, platform, &mut states).await?;
        self.resolve_topics(posts, platform, &mut states).await?;

        let default_score = self.context.normalization.default_score;
        let scores: Vec<PostScore> = states
            .into_iter()
            .map(|state| match state {
                PostState::Resolved(score) => score,
                PostState::Unresolved => PostScore {
                    score: default_score,
                    source: ScoreSource::Default,
                },
            })
            .collect();

        let (mut by_domain, mut by_topic) = (0usize, 0usize);
        for s in &scores {
            match s.source {
                ScoreSource::Domain { .. } => by_domain += 1,
                ScoreSource::Topic { .. } => by_topic += 1,
                ScoreSource::Default => {}
            }
        }
        info!(
            posts = posts.len(),
            %platform,
            by_domain,
            by_topic,
            defaulted = posts.len() - by_domain - by_topic,
            "Scored batch"
        );

        Ok(scores)
    }

    /// What every post gets when a batch fails as a whole.
    pub fn fallback_scores(&self, len: usize) -> Vec<PostScore> {
        vec![
            PostScore {
                score: self.context.normalization.default_score,
                source: ScoreSource::Default,
            };
            len
        ]
    }

    async fn resolve_domains(
        &self,
        posts: &[Post],
        platform: Platform,
        states: &mut [PostState],
    ) -> Result<(), ScoringError> {
        let (indices, urls): (Vec<usize>, Vec<String>) = posts
            .iter()
            .enumerate()
            .filter_map(|(i, post)| {
                candidate_url(post, platform, &self.context.blocklist).map(|url| (i, url))
            })
            .unzip();
        if urls.is_empty() {
            return Ok(());
        }

        let resolved = self.unshortener.unshorten(&urls).await;
        if resolved.len() != urls.len() {
            return Err(ScoringError::LengthMismatch {
                stage: "unshortener",
                expected: urls.len(),
                got: resolved.len(),
            });
        }

        for (&idx, url) in indices.iter().zip(&resolved) {
            if let Some(score) = self.domain_score(url) {
                states[idx] = PostState::Resolved(score);
            }
        }
        Ok(())
    }

    fn domain_score(&self, url: &str) -> Option<PostScore> {
        let Some(domain) = registrable_domain(url) else {
            debug!(url, "Malformed URL, no host");
            return None;
        };
        let raw = self.context.domains.get(&domain)?;
        if self.context.blocklist.blocks(&domain) {
            return None;
        }
        Some(PostScore {
            score: self.context.normalization.domain_z(raw),
            source: ScoreSource::Domain { domain },
        })
    }

    async fn resolve_topics(
        &self,
        posts: &[Post],
        platform: Platform,
        states: &mut [PostState],
    ) -> Result<(), ScoringError> {
        let (indices, texts): (Vec<usize>, Vec<String>) = states
            .iter()
            .enumerate()
            .filter(|(_, state)| matches!(state, PostState::Unresolved))
            .filter_map(|(i, _)| {
                post_text(&posts[i], platform)
                    .and_then(|text| usable_text(&text))
                    .map(|text| (i, text))
            })
            .unzip();
        if texts.is_empty() {
            return Ok(());
        }

        let topics = self
            .classifier
            .classify_topics(&texts)
            .await
            .map_err(ScoringError::Classifier)?;
        if topics.len() != texts.len() {
            return Err(ScoringError::LengthMismatch {
                stage: "topic classifier",
                expected: texts.len(),
                got: topics.len(),
            });
        }

        for (&idx, &topic) in indices.iter().zip(&topics) {
            if topic == NO_TOPIC {
                continue;
            }
            let raw = self
                .context
                .topics
                .get(topic)
                .ok_or(ScoringError::UnknownTopic(topic))?;
            states[idx] = PostState::Resolved(PostScore {
                score: self.context.normalization.topic_z(raw),
                source: ScoreSource::Topic { topic },
            });
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
