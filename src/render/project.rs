//! Composes per-keyframe scene renders into one animation: a shared viewport
//! transform, the depth order of keyframe 0 applied to every frame, and a
//! culling decision taken across all keyframes at once.

use crate::error::{FlatshadeError, FlatshadeResult};
use crate::math::Vec2;
use crate::model::{Color, Fit, Project};
use crate::render::scene::{SceneShape, render_scene};

#[derive(Clone, Debug, serde::Serialize)]
pub struct FrameRender {
    pub time: f64,
    pub shapes: Vec<SceneShape>,
    pub stroke_color: Color,
    pub stroke_thickness: f64,
    pub anchor_point: Vec2,
}

/// The host-facing result: one record per keyframe, shapes already in
/// stacking order.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ProjectRender {
    pub name: String,
    pub frames: Vec<FrameRender>,
}

/// Uniform scale mapping the logical frame size onto the target viewport.
pub fn fit_scale(frame_size: Vec2, target_size: Vec2, fit: Fit) -> f64 {
    let scale_to_fit = target_size / frame_size;
    match fit {
        Fit::Width => scale_to_fit.x(),
        Fit::Height => scale_to_fit.y(),
        Fit::Min => scale_to_fit.min_component(),
        Fit::Max => scale_to_fit.max_component(),
    }
}

#[tracing::instrument(skip_all, fields(name = %project.name, keyframes = project.keyframes.len()))]
pub fn render_project(project: &Project, target_size: Vec2) -> FlatshadeResult<ProjectRender> {
    if project.keyframes.is_empty() {
        return Err(FlatshadeError::geometry("no keyframes to render"));
    }

    let mut frames: Vec<FrameRender> = Vec::with_capacity(project.keyframes.len());
    let mut first_order = Vec::new();
    for keyframe in &project.keyframes {
        let render = render_scene(&keyframe.scene);
        if frames.is_empty() {
            first_order = render.order;
        }
        frames.push(FrameRender {
            time: keyframe.time,
            shapes: render.shapes,
            stroke_color: render.stroke_color,
            stroke_thickness: render.stroke_thickness,
            anchor_point: render.anchor_point,
        });
    }

    // One viewport transform for the whole animation: scale per fit mode,
    // then center the projection origin in the target.
    let scale = fit_scale(project.frame_size, target_size, project.fit);
    let center = target_size / 2.0;
    for frame in &mut frames {
        for shape in &mut frame.shapes {
            for point in &mut shape.points {
                *point = *point * scale + center;
            }
        }
        frame.anchor_point = frame.anchor_point * scale + center;
    }

    // Keyframe 0's depth order stacks every frame; frames never re-stack.
    for frame in &mut frames {
        frame.shapes = first_order.iter().map(|&i| frame.shapes[i].clone()).collect();
    }

    if project.cull_back {
        cull_back(&mut frames);
    }

    tracing::debug!(
        shapes = frames[0].shapes.len(),
        "project rendered"
    );
    Ok(ProjectRender {
        name: project.name.clone(),
        frames,
    })
}

/// Drops a shape slot from every frame only when it is back-facing in all of
/// them; one front-facing appearance keeps the slot everywhere so indices
/// stay aligned across frames.
fn cull_back(frames: &mut [FrameRender]) {
    let Some(first) = frames.first() else {
        return;
    };
    let keep: Vec<bool> = (0..first.shapes.len())
        .map(|s| frames.iter().any(|f| !f.shapes[s].back))
        .collect();
    for frame in frames {
        let mut kept = keep.iter();
        frame.shapes.retain(|_| *kept.next().unwrap_or(&true));
    }
}
