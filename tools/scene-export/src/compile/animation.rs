//! Timelines to glTF animations

use glb_builder::{Valid, json};
use scenepack_shared::{Keyframe, Timeline, TimelineTrack, euler_degrees_to_quat};

use super::{DirectCompiler, normalize_quat};

enum TrackValues {
    Vec3(Vec<[f32; 3]>),
    Quat(Vec<[f32; 4]>),
}

impl DirectCompiler {
    pub(super) fn compile_timeline(&mut self, timeline: &Timeline, path: &str) {
        let mut samplers = Vec::new();
        let mut channels = Vec::new();

        for (t, track) in timeline.tracks.iter().enumerate() {
            let track_path = format!("{}.tracks[{}]", path, t);
            let Some(&target) = self.named_nodes.get(&track.target) else {
                self.warnings.push(
                    track_path,
                    format!("target '{}' not found, track dropped", track.target),
                );
                continue;
            };
            if track.keyframes.is_empty() {
                self.warnings.push(track_path, "track has no keyframes");
                continue;
            }

            let mut keyframes: Vec<&Keyframe> = track.keyframes.iter().collect();
            keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
            // Key times must strictly increase; the first key at a time wins
            keyframes.dedup_by(|later, earlier| later.time == earlier.time);

            let Some((property, values)) = track_values(track, &keyframes) else {
                self.warnings.push(
                    track_path,
                    format!(
                        "property '{}' with these keyframe values cannot be animated",
                        track.property
                    ),
                );
                continue;
            };
            let interpolation = match track.interpolation.as_deref() {
                None | Some("linear") => json::animation::Interpolation::Linear,
                Some("step") => json::animation::Interpolation::Step,
                Some(other) => {
                    self.warnings.push(
                        &track_path,
                        format!("interpolation '{}' not supported, using linear", other),
                    );
                    json::animation::Interpolation::Linear
                }
            };

            let times: Vec<f32> = keyframes.iter().map(|k| k.time).collect();
            let input = self.buffer.pack_scalars_with_bounds(&times);
            let output = match &values {
                TrackValues::Vec3(values) => self.buffer.pack_keyframes_vec3(values),
                TrackValues::Quat(values) => self.buffer.pack_keyframes_vec4(values),
            };

            let sampler = samplers.len() as u32;
            samplers.push(json::animation::Sampler {
                input: input.as_json_index(),
                interpolation: Valid(interpolation),
                output: output.as_json_index(),
                extensions: Default::default(),
                extras: Default::default(),
            });
            channels.push(json::animation::Channel {
                sampler: json::Index::new(sampler),
                target: json::animation::Target {
                    node: json::Index::new(target),
                    path: Valid(property),
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        if channels.is_empty() {
            self.warnings
                .push(path, format!("timeline '{}' has no animatable tracks", timeline.name));
            return;
        }
        if timeline.looping {
            tracing::debug!("timeline '{}': looping is left to the player", timeline.name);
        }

        self.root.animations.push(json::Animation {
            name: Some(timeline.name.clone()),
            channels,
            samplers,
            extensions: Default::default(),
            extras: Default::default(),
        });
    }
}

fn track_values(
    track: &TimelineTrack,
    keyframes: &[&Keyframe],
) -> Option<(json::animation::Property, TrackValues)> {
    use json::animation::Property;

    let vec3s = || -> Option<Vec<[f32; 3]>> {
        keyframes.iter().map(|k| keyframe_vec3(&k.value)).collect()
    };
    match track.property.as_str() {
        "position" | "translation" => Some((Property::Translation, TrackValues::Vec3(vec3s()?))),
        "scale" => Some((Property::Scale, TrackValues::Vec3(vec3s()?))),
        "rotation" => {
            let quats = keyframes
                .iter()
                .map(|k| match k.value.as_slice() {
                    &[x, y, z] => Some(euler_degrees_to_quat([x, y, z])),
                    &[x, y, z, w] => Some(normalize_quat([x, y, z, w])),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?;
            Some((Property::Rotation, TrackValues::Quat(quats)))
        }
        _ => None,
    }
}

/// Three components, or one value applied to all axes
fn keyframe_vec3(value: &[f32]) -> Option<[f32; 3]> {
    match *value {
        [v] => Some([v; 3]),
        [x, y, z] => Some([x, y, z]),
        _ => None,
    }
}
