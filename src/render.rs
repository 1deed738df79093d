use std::fmt::{self, Write};

use serde::Serialize;

use crate::model::GenerationModel;
use crate::naming::to_camel_case;
use crate::types::TargetType;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Format error: {0}")]
    Format(#[from] fmt::Error),
}

/// A rendered source file, `path` relative to the package root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

pub trait Renderer {
    fn render(&self, model: &GenerationModel) -> Result<Vec<GeneratedFile>, RenderError>;
}

/// Entity, repository, service and controller for each table.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaRenderer;

impl Renderer for JavaRenderer {
    fn render(&self, model: &GenerationModel) -> Result<Vec<GeneratedFile>, RenderError> {
        let class = &model.class_name;

        let mut entity = String::new();
        write_entity(&mut entity, model)?;
        let mut repository = String::new();
        write_repository(&mut repository, model)?;
        let mut service = String::new();
        write_service(&mut service, model)?;
        let mut controller = String::new();
        write_controller(&mut controller, model)?;

        Ok(vec![
            GeneratedFile {
                path: format!("entity/{}.java", class),
                content: entity,
            },
            GeneratedFile {
                path: format!("repository/{}Repository.java", class),
                content: repository,
            },
            GeneratedFile {
                path: format!("service/{}Service.java", class),
                content: service,
            },
            GeneratedFile {
                path: format!("controller/{}Controller.java", class),
                content: controller,
            },
        ])
    }
}

/// Repository key type. Tables without a primary key fall back to `Long`.
fn id_type(model: &GenerationModel) -> TargetType {
    model.id_type().unwrap_or(TargetType::Long)
}

fn write_entity(out: &mut String, m: &GenerationModel) -> fmt::Result {
    writeln!(out, "package {}.entity;", m.package_name)?;
    writeln!(out)?;
    writeln!(out, "import jakarta.persistence.*;")?;
    writeln!(out, "import lombok.Getter;")?;
    writeln!(out, "import lombok.Setter;")?;
    for import in &m.imports {
        writeln!(out, "import {};", import)?;
    }
    writeln!(out)?;
    writeln!(out, "@Entity")?;
    writeln!(out, "@Table(name = \"{}\")", m.table_name)?;
    writeln!(out, "@Getter")?;
    writeln!(out, "@Setter")?;
    writeln!(out, "public class {} {{", m.class_name)?;

    for field in &m.fields {
        writeln!(out)?;
        if field.is_id {
            writeln!(out, "    @Id")?;
            if m.has_increment {
                writeln!(out, "    @GeneratedValue(strategy = GenerationType.IDENTITY)")?;
            }
        }
        writeln!(out, "    @Column(name = \"{}\")", field.column_name)?;
        writeln!(out, "    private {} {};", field.target, field.field_name)?;
    }

    for rel in &m.many_to_one {
        writeln!(out)?;
        writeln!(out, "    @ManyToOne(fetch = FetchType.LAZY)")?;
        writeln!(out, "    @JoinColumn(name = \"{}\")", rel.join_column)?;
        writeln!(out, "    private {} {};", rel.target_class, rel.field_name)?;
    }

    for rel in &m.one_to_many {
        writeln!(out)?;
        writeln!(out, "    @OneToMany(mappedBy = \"{}\")", rel.mapped_by)?;
        writeln!(out, "    private List<{}> {};", rel.target_class, rel.field_name)?;
    }

    writeln!(out, "}}")
}

fn write_repository(out: &mut String, m: &GenerationModel) -> fmt::Result {
    let id = id_type(m);
    writeln!(out, "package {}.repository;", m.package_name)?;
    writeln!(out)?;
    writeln!(out, "import {}.entity.{};", m.package_name, m.class_name)?;
    writeln!(out, "import org.springframework.data.jpa.repository.JpaRepository;")?;
    writeln!(out, "import org.springframework.stereotype.Repository;")?;
    if let Some(hint) = id.import_hint() {
        writeln!(out, "import {};", hint)?;
    }
    writeln!(out)?;
    writeln!(out, "@Repository")?;
    writeln!(
        out,
        "public interface {}Repository extends JpaRepository<{}, {}> {{",
        m.class_name, m.class_name, id
    )?;
    writeln!(out, "}}")
}

fn write_service(out: &mut String, m: &GenerationModel) -> fmt::Result {
    let class = &m.class_name;
    let repo = format!("{}Repository", to_camel_case(class));
    let id = id_type(m);

    writeln!(out, "package {}.service;", m.package_name)?;
    writeln!(out)?;
    writeln!(out, "import {}.entity.{};", m.package_name, class)?;
    writeln!(out, "import {}.repository.{}Repository;", m.package_name, class)?;
    writeln!(out, "import org.springframework.stereotype.Service;")?;
    writeln!(out, "import java.util.List;")?;
    writeln!(out, "import java.util.Optional;")?;
    if let Some(hint) = id.import_hint() {
        writeln!(out, "import {};", hint)?;
    }
    writeln!(out)?;
    writeln!(out, "@Service")?;
    writeln!(out, "public class {}Service {{", class)?;
    writeln!(out, "    private final {}Repository {};", class, repo)?;
    writeln!(out)?;
    writeln!(out, "    public {}Service({}Repository {}) {{", class, class, repo)?;
    writeln!(out, "        this.{} = {};", repo, repo)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    public List<{}> findAll() {{", class)?;
    writeln!(out, "        return {}.findAll();", repo)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    public Optional<{}> findById({} id) {{", class, id)?;
    writeln!(out, "        return {}.findById(id);", repo)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    public {} save({} entity) {{", class, class)?;
    writeln!(out, "        return {}.save(entity);", repo)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    public void deleteById({} id) {{", id)?;
    writeln!(out, "        {}.deleteById(id);", repo)?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")
}

fn write_controller(out: &mut String, m: &GenerationModel) -> fmt::Result {
    let class = &m.class_name;
    let service = format!("{}Service", to_camel_case(class));
    let id = id_type(m);

    writeln!(out, "package {}.controller;", m.package_name)?;
    writeln!(out)?;
    writeln!(out, "import {}.entity.{};", m.package_name, class)?;
    writeln!(out, "import {}.service.{}Service;", m.package_name, class)?;
    writeln!(out, "import org.springframework.http.ResponseEntity;")?;
    writeln!(out, "import org.springframework.web.bind.annotation.*;")?;
    writeln!(out, "import java.util.List;")?;
    if let Some(hint) = id.import_hint() {
        writeln!(out, "import {};", hint)?;
    }
    writeln!(out)?;
    writeln!(out, "@RestController")?;
    writeln!(out, "@RequestMapping(\"/api/{}\")", m.table_name)?;
    writeln!(out, "public class {}Controller {{", class)?;
    writeln!(out, "    private final {}Service {};", class, service)?;
    writeln!(out)?;
    writeln!(out, "    public {}Controller({}Service {}) {{", class, class, service)?;
    writeln!(out, "        this.{} = {};", service, service)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    @GetMapping")?;
    writeln!(out, "    public List<{}> list() {{", class)?;
    writeln!(out, "        return {}.findAll();", service)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    @GetMapping(\"/{{id}}\")")?;
    writeln!(out, "    public ResponseEntity<{}> get(@PathVariable {} id) {{", class, id)?;
    writeln!(out, "        return {}.findById(id)", service)?;
    writeln!(out, "                .map(ResponseEntity::ok)")?;
    writeln!(out, "                .orElse(ResponseEntity.notFound().build());")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    @PostMapping")?;
    writeln!(out, "    public {} create(@RequestBody {} entity) {{", class, class)?;
    writeln!(out, "        return {}.save(entity);", service)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    @DeleteMapping(\"/{{id}}\")")?;
    writeln!(out, "    public void delete(@PathVariable {} id) {{", id)?;
    writeln!(out, "        {}.deleteById(id);", service)?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")
}
