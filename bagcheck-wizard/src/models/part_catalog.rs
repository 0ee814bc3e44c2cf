//! Required photo parts
//!
//! The catalog is fixed and ordered: the wizard walks it front to back, one
//! step per entry.

use serde::Serialize;

/// Name of the part whose photo is sent for classification
pub const PRIMARY_PART: &str = "Material";

/// One required photo category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartDefinition {
    /// Unique display name
    pub name: &'static str,
    /// Handle of the reference image, resolved by the host UI
    pub reference_image: &'static str,
    /// Capture instructions shown next to the reference image
    pub description: &'static str,
}

pub static REQUIRED_PARTS: [PartDefinition; 5] = [
    PartDefinition {
        name: "Material",
        reference_image: "assets/images/material.jpg",
        description: "Macro/close-up shots of the primary material (leather, canvas, textile, synthetic) \
            to show grain, weave, texture, and surface treatments. Photograph under neutral lighting to \
            reveal color accuracy, pores, stamping, and backing where possible; include an area with a \
            ruler or common object for scale if texture detail is important. If the item has multiple \
            materials or linings, provide representative samples of each.",
    },
    PartDefinition {
        name: "Label",
        reference_image: "assets/images/label.jpg",
        description: "High-resolution close-up of the item's label or tag showing brand name, \
            serial/model numbers, font details and stitching around the label. Ensure good lighting, \
            minimal glare, and include the full label edge-to-edge so any holograms, heat stamps, or \
            embossed marks are visible. If applicable, capture both interior and exterior label \
            variants and any unique identifiers.",
    },
    PartDefinition {
        name: "Hardware",
        reference_image: "assets/images/hardware.jpg",
        description: "Clear photos of metal or plastic hardware (buckles, zipper pulls, snaps, rivets, \
            studs, logo plates) from multiple angles to show finish, mold marks, markings, and \
            attachment points. Include close-ups of any engraved or stamped logos, screws, and the \
            back/underside of hardware pieces. Try to capture patina, wear patterns, or plating \
            inconsistencies that can indicate authentic manufacturing methods.",
    },
    PartDefinition {
        name: "Stitching",
        reference_image: "assets/images/stitching.jpg",
        description: "Detailed images of stitching lines, seam junctions, edge finishing and thread \
            color/quality across several critical points (handles, strap attachments, label \
            surrounds, hems). Capture stitch length, alignment, tension consistency, and any \
            bar-tacks or reinforced stitching. Provide both close-up and slightly wider shots to \
            show context.",
    },
    PartDefinition {
        name: "Zipper",
        reference_image: "assets/images/zipper.jpg",
        description: "Close-up images of the zipper teeth, slider, pull tab, and zipper tape including \
            any brand stamps or mold marks on the slider. Show the zipper in both open and closed \
            positions and photograph the start/stop ends and internal stitching around the zipper. \
            If there are serial codes or manufacturer markings on the zipper, make them legible.",
    },
];

/// Number of steps in the wizard
pub fn part_count() -> usize {
    REQUIRED_PARTS.len()
}

/// Part definition for a step index
pub fn part_at(index: usize) -> Option<&'static PartDefinition> {
    REQUIRED_PARTS.get(index)
}

/// Look up a part by name (case-sensitive)
pub fn find_part(name: &str) -> Option<&'static PartDefinition> {
    REQUIRED_PARTS.iter().find(|p| p.name == name)
}
