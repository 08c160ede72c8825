// ABOUTME: PPTX generation module for the pptreport application
// ABOUTME: Renders placed slides into a PowerPoint package written with zip

use crate::content::ResolvedItem;
use crate::errors::{ReportError, Result};
use crate::geometry::{Alignment, HAlign, Rect, SlideSize, VAlign};
use crate::render::{self, Renderer};
use crate::utils;
use log::{debug, info};
use quick_xml::escape::escape;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::{write::FileOptions, ZipWriter};

/// English Metric Units per centimeter.
const EMU_PER_CM: f64 = 360_000.0;

const TITLE_FONT_SIZE: f64 = 28.0;
const CAPTION_FONT_SIZE: f64 = 12.0;

const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_NOTES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

fn emu(cm: f64) -> i64 {
    (cm * EMU_PER_CM).round() as i64
}

/// Configuration for PPTX generation
#[derive(Debug, Clone)]
pub struct PptxConfig {
    pub title: String,
    pub size: SlideSize,
    /// Outline every content box, for checking layouts.
    pub show_borders: bool,
}

impl Default for PptxConfig {
    fn default() -> Self {
        Self {
            title: "Report".to_string(),
            size: SlideSize::default(),
            show_borders: false,
        }
    }
}

#[derive(Default)]
struct SlidePart {
    shapes: String,
    next_id: u32,
    relationships: Vec<(String, &'static str, String)>,
    notes: Option<String>,
}

impl SlidePart {
    fn shape_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn relate(&mut self, kind: &'static str, target: String) -> String {
        let id = format!("rId{}", self.relationships.len() + 1);
        self.relationships.push((id.clone(), kind, target));
        id
    }
}

/// Collects slides in memory and writes the package on [`PptxRenderer::finish`].
pub struct PptxRenderer {
    config: PptxConfig,
    slides: Vec<SlidePart>,
    current: Option<SlidePart>,
    /// Media part name per source file, so repeated pictures are stored once.
    media_names: HashMap<PathBuf, String>,
    media: Vec<(String, Vec<u8>)>,
}

impl PptxRenderer {
    pub fn new(config: PptxConfig) -> Self {
        Self {
            config,
            slides: Vec::new(),
            current: None,
            media_names: HashMap::new(),
            media: Vec::new(),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn slide(&mut self) -> Result<&mut SlidePart> {
        self.current
            .as_mut()
            .ok_or_else(|| ReportError::Package("No slide has been started".to_string()))
    }

    fn media_for(&mut self, path: &Path) -> Result<String> {
        if let Some(name) = self.media_names.get(path) {
            return Ok(name.clone());
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "png".to_string());
        let name = format!("image{}.{}", self.media.len() + 1, ext);
        let data = fs::read(path)?;
        debug!("Adding image to PPTX: ppt/media/{}", name);
        self.media.push((name.clone(), data));
        self.media_names.insert(path.to_path_buf(), name.clone());
        Ok(name)
    }

    fn place_picture(&mut self, rect: Rect, path: &Path, alignment: Alignment) -> Result<()> {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| ReportError::Image(format!("Failed to read image {:?}: {}", path, e)))?;
        let (fit_width, fit_height) = rect.fit(width as f64, height as f64);
        let target = rect.place(fit_width, fit_height, alignment);

        let media = self.media_for(path)?;
        let name = escape(&path.to_string_lossy()).into_owned();
        let slide = self.slide()?;
        let rel = slide.relate(REL_IMAGE, format!("../media/{}", media));
        let id = slide.shape_id();
        slide.shapes.push_str(&format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}" descr="{name}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            xfrm = xfrm(target),
        ));
        Ok(())
    }

    fn place_text(
        &mut self,
        rect: Rect,
        text: &str,
        alignment: Alignment,
        fontsize: Option<f64>,
        bold: bool,
    ) -> Result<()> {
        let anchor = match alignment.vertical {
            VAlign::Upper => "t",
            VAlign::Center => "ctr",
            VAlign::Lower => "b",
        };
        let fit = if fontsize.is_some() {
            "<a:noAutofit/>"
        } else {
            "<a:normAutofit/>"
        };
        let mut run_props = String::from(r#"lang="en-US""#);
        if let Some(size) = fontsize {
            run_props.push_str(&format!(r#" sz="{}""#, (size * 100.0).round() as i64));
        }
        if bold {
            run_props.push_str(r#" b="1""#);
        }

        let paragraphs: String = text
            .lines()
            .map(|line| {
                format!(
                    r#"<a:p><a:pPr algn="{}"/><a:r><a:rPr {}/><a:t>{}</a:t></a:r></a:p>"#,
                    horizontal(alignment.horizontal),
                    run_props,
                    escape(line)
                )
            })
            .collect();
        let paragraphs = if paragraphs.is_empty() {
            "<a:p/>".to_string()
        } else {
            paragraphs
        };

        let slide = self.slide()?;
        let id = slide.shape_id();
        slide.shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" anchor="{anchor}">{fit}</a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
            xfrm = xfrm(rect),
        ));
        Ok(())
    }

    fn border(&mut self, rect: Rect) -> Result<()> {
        let slide = self.slide()?;
        let id = slide.shape_id();
        slide.shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Border {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/><a:ln w="12700"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln></p:spPr></p:sp>"#,
            xfrm = xfrm(rect),
        ));
        Ok(())
    }

    /// Write the package to `output_file`.
    pub fn finish(mut self, output_file: &Path) -> Result<()> {
        if let Some(open) = self.current.take() {
            self.slides.push(open);
        }
        info!("Writing {} slides to {:?}", self.slides.len(), output_file);

        utils::ensure_parent_directory_exists(output_file)?;
        let file = fs::File::create(output_file)?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(self.content_types().as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#,
        )?;

        zip.start_file("docProps/app.xml", options)?;
        let app_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>pptreport</Application>
    <Slides>{}</Slides>
</Properties>"#,
            self.slides.len()
        );
        zip.write_all(app_xml.as_bytes())?;

        zip.start_file("docProps/core.xml", options)?;
        let core_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dc:creator>pptreport</dc:creator>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
    <cp:revision>1</cp:revision>
</cp:coreProperties>"#,
            escape(&self.config.title),
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        );
        zip.write_all(core_xml.as_bytes())?;

        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;
        let rels: Vec<(String, &'static str, String)> = (1..=self.slides.len())
            .map(|n| (format!("rId{}", n), REL_SLIDE, format!("slides/slide{}.xml", n)))
            .collect();
        zip.write_all(relationships(&rels).as_bytes())?;

        zip.start_file("ppt/presentation.xml", options)?;
        zip.write_all(self.presentation_xml().as_bytes())?;

        for (media, data) in &self.media {
            zip.start_file(format!("ppt/media/{}", media), options)?;
            zip.write_all(data)?;
        }

        for (i, slide) in self.slides.iter().enumerate() {
            let number = i + 1;
            debug!("Creating slide XML: ppt/slides/slide{}.xml", number);

            zip.start_file(format!("ppt/slides/slide{}.xml", number), options)?;
            let slide_xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NAMESPACES}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
                slide.shapes
            );
            zip.write_all(slide_xml.as_bytes())?;

            zip.start_file(format!("ppt/slides/_rels/slide{}.xml.rels", number), options)?;
            zip.write_all(relationships(&slide.relationships).as_bytes())?;

            if let Some(notes) = &slide.notes {
                zip.start_file(format!("ppt/notesSlides/notesSlide{}.xml", number), options)?;
                zip.write_all(notes_xml(notes).as_bytes())?;

                zip.start_file(
                    format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", number),
                    options,
                )?;
                let back = vec![(
                    "rId1".to_string(),
                    REL_SLIDE,
                    format!("../slides/slide{}.xml", number),
                )];
                zip.write_all(relationships(&back).as_bytes())?;
            }
        }

        zip.finish()?;
        info!("PPTX file created at {:?}", output_file);
        Ok(())
    }

    fn content_types(&self) -> String {
        let mut overrides = String::new();
        for (i, slide) in self.slides.iter().enumerate() {
            overrides.push_str(&format!(
                r#"    <Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                i + 1
            ));
            overrides.push('\n');
            if slide.notes.is_some() {
                overrides.push_str(&format!(
                    r#"    <Override PartName="/ppt/notesSlides/notesSlide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"/>"#,
                    i + 1
                ));
                overrides.push('\n');
            }
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="jpeg" ContentType="image/jpeg"/>
    <Default Extension="jpg" ContentType="image/jpeg"/>
    <Default Extension="png" ContentType="image/png"/>
    <Default Extension="gif" ContentType="image/gif"/>
    <Default Extension="bmp" ContentType="image/bmp"/>
    <Default Extension="tif" ContentType="image/tiff"/>
    <Default Extension="tiff" ContentType="image/tiff"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
{overrides}</Types>"#
        )
    }

    fn presentation_xml(&self) -> String {
        let slide_ids = (0..self.slides.len())
            .map(|i| format!(r#"        <p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 1))
            .collect::<Vec<String>>()
            .join("\n");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NAMESPACES}>
    <p:sldIdLst>
{slide_ids}
    </p:sldIdLst>
    <p:sldSz cx="{cx}" cy="{cy}"/>
    <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#,
            cx = emu(self.config.size.width),
            cy = emu(self.config.size.height)
        )
    }
}

impl Renderer for PptxRenderer {
    fn begin_slide(&mut self, notes: Option<&str>) -> Result<()> {
        if let Some(open) = self.current.take() {
            self.slides.push(open);
        }
        let number = self.slides.len() + 1;
        let mut slide = SlidePart {
            // id 1 is the shape tree itself
            next_id: 1,
            ..SlidePart::default()
        };
        if let Some(text) = notes {
            slide.relate(REL_NOTES, format!("../notesSlides/notesSlide{}.xml", number));
            slide.notes = Some(text.to_string());
        }
        self.current = Some(slide);
        debug!("Started slide {}", number);
        Ok(())
    }

    fn title(&mut self, rect: Rect, text: &str) -> Result<()> {
        let alignment = Alignment {
            vertical: VAlign::Center,
            horizontal: HAlign::Center,
        };
        self.place_text(rect, text, alignment, Some(TITLE_FONT_SIZE), true)
    }

    fn place(
        &mut self,
        rect: Rect,
        item: &ResolvedItem,
        alignment: Alignment,
        fontsize: Option<f64>,
    ) -> Result<()> {
        if self.config.show_borders {
            self.border(rect)?;
        }

        match item {
            ResolvedItem::Path { path, .. } if render::is_picture(path) => {
                self.place_picture(rect, path, alignment)
            }
            ResolvedItem::Path { path, .. } => {
                let text = fs::read_to_string(path)?;
                self.place_text(rect, &text, alignment, fontsize, false)
            }
            ResolvedItem::Text { value } => self.place_text(rect, value, alignment, fontsize, false),
            ResolvedItem::Empty { .. } | ResolvedItem::Skipped { .. } => Ok(()),
        }
    }

    fn label(&mut self, rect: Rect, text: &str, alignment: HAlign) -> Result<()> {
        let alignment = Alignment {
            vertical: VAlign::Lower,
            horizontal: alignment,
        };
        self.place_text(rect, text, alignment, Some(CAPTION_FONT_SIZE), false)
    }

    fn end_slide(&mut self) -> Result<()> {
        let slide = self
            .current
            .take()
            .ok_or_else(|| ReportError::Package("No slide has been started".to_string()))?;
        self.slides.push(slide);
        Ok(())
    }
}

fn horizontal(align: HAlign) -> &'static str {
    match align {
        HAlign::Left => "l",
        HAlign::Center => "ctr",
        HAlign::Right => "r",
    }
}

fn xfrm(rect: Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(rect.x),
        emu(rect.y),
        emu(rect.width),
        emu(rect.height)
    )
}

fn relationships(rels: &[(String, &'static str, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"    <Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, kind, target
        ));
        xml.push('\n');
    }
    xml.push_str("</Relationships>");
    xml
}

fn notes_xml(notes: &str) -> String {
    let paragraphs: String = notes
        .lines()
        .map(|line| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", escape(line)))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes {NAMESPACES}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Notes Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#,
        if paragraphs.is_empty() { "<a:p/>".to_string() } else { paragraphs }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_centimeters_to_emu() {
        assert_eq!(emu(1.0), 360_000);
        assert_eq!(emu(25.4), 9_144_000);
        assert_eq!(emu(19.05), 6_858_000);
    }

    #[test]
    fn text_is_escaped() {
        let mut renderer = PptxRenderer::new(PptxConfig::default());
        renderer.begin_slide(None).unwrap();
        renderer
            .place(
                Rect::new(0.0, 0.0, 5.0, 5.0),
                &ResolvedItem::text("a < b & c"),
                Alignment::default(),
                Some(14.0),
            )
            .unwrap();
        let shapes = &renderer.current.as_ref().unwrap().shapes;
        assert!(shapes.contains("a &lt; b &amp; c"));
        assert!(shapes.contains(r#"sz="1400""#));
    }

    #[test]
    fn place_requires_an_open_slide() {
        let mut renderer = PptxRenderer::new(PptxConfig::default());
        let result = renderer.place(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            &ResolvedItem::text("x"),
            Alignment::default(),
            None,
        );
        assert!(matches!(result, Err(ReportError::Package(_))));
    }
}
