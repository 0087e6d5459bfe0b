/// Presents a framebuffer as coloured terminal cells
use crossterm::{
    cursor,
    style::{self, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use strata_core::Color;

use crate::framebuffer::Framebuffer;

/// Character luminosity ramp (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Ramp character for the perceived brightness of `color`.
pub fn ramp_char(color: Color) -> char {
    let luma = 0.299 * color.r as f32 + 0.587 * color.g as f32 + 0.114 * color.b as f32;
    let brightness = luma / 255.0 * color.a as f32 / 255.0;
    let index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Maps one framebuffer pixel to one terminal cell.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    status: Option<String>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text drawn over the first row on the next present.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn present<W: Write>(
        &self,
        framebuffer: &Framebuffer,
        writer: &mut W,
    ) -> std::io::Result<()> {
        let width = framebuffer.width();
        for (y, row) in framebuffer.pixels().chunks(width.max(1)).enumerate() {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            let mut current = None;
            for &pixel in row {
                let fg = style::Color::Rgb { r: pixel.r, g: pixel.g, b: pixel.b };
                if current != Some(fg) {
                    writer.queue(SetForegroundColor(fg))?;
                    current = Some(fg);
                }
                writer.queue(Print(ramp_char(pixel)))?;
            }
        }

        if let Some(status) = &self.status {
            writer.queue(cursor::MoveTo(0, 0))?;
            writer.queue(SetForegroundColor(style::Color::Yellow))?;
            writer.queue(Print(status.chars().take(width).collect::<String>()))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
