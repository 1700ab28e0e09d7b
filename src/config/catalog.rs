//! Fixed value lists the forms are validated against.

/// Upper bound for integer columns (PostgreSQL INTEGER).
pub const MAX_NUMBER_ON_DATABASE: i64 = 2_147_483_647;

/// Page size for every paginated listing.
pub const MAX_ELEMENTS_ON_PAGE: i64 = 9;

/// Uploads must be strictly smaller than this.
pub const MAX_FILE_SIZE_BYTES: usize = 15 * 1024 * 1024;

pub const ACCEPTED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".xls", ".xlsx", ".jpeg", ".jpg"];

pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "image/jpeg",
    "image/jpg",
];

pub const ARGENTINIAN_PROVINCES: &[&str] = &[
    "Buenos Aires",
    "Ciudad Autónoma de Buenos Aires",
    "Catamarca",
    "Chaco",
    "Chubut",
    "Córdoba",
    "Corrientes",
    "Entre Ríos",
    "Formosa",
    "Jujuy",
    "La Pampa",
    "La Rioja",
    "Mendoza",
    "Misiones",
    "Neuquén",
    "Río Negro",
    "Salta",
    "San Juan",
    "San Luis",
    "Santa Cruz",
    "Santa Fe",
    "Santiago del Estero",
    "Tierra del Fuego",
    "Tucumán",
];

pub const DISABILITIES_IN_SYSTEM: &[&str] = &[
    "ECNE",
    "Lesión post-traumática",
    "Mielomeningocele",
    "Esclerosis Múltiple",
    "Escoliosis Leve",
    "Secuelas de ACV",
    "Discapacidad Intelectual",
    "Trastorno del Espectro Autista",
    "Trastorno del Aprendizaje",
    "TDAH",
    "Trastorno de la Comunicación",
    "Trastorno de Ansiedad",
    "Síndrome de Down",
    "Retraso Madurativo",
    "Psicosis",
    "Trastorno de Conducta",
    "Trastornos del ánimo y afectivos",
    "Trastorno Alimentario",
    "OTRO",
];

pub const OTHER_DIAGNOSIS: &str = "OTRO";

pub const DISABILITY_TYPES: &[&str] = &["Mental", "Motora", "Sensorial", "Visceral"];

pub const SOCIAL_BENEFITS: &[&str] = &[
    "asignacion_por_hijo",
    "asignacion_por_hijo_con_discapacidad",
    "asignacion_por_ayuda_escolar",
];

pub const PENSION_TYPES: &[&str] = &["Nacional", "Provincial"];

pub const ROLES: &[&str] = &["Administracion", "Tecnica", "Ecuestre", "Voluntariado", "Editor"];

pub const ADMIN_ROLE: &str = "Administracion";
pub const EDITOR_ROLE: &str = "Editor";
pub const VOLUNTEER_ROLE: &str = "Voluntariado";

pub const CONDITIONS: &[&str] = &["Personal Rentado", "Voluntario"];

pub const PROFESSIONS: &[&str] = &[
    "Psicologo/a",
    "Medico/a",
    "Kinesiologo/a",
    "Psicomotricista",
    "Terapista Ocupacional",
    "Psicopedagogo/a",
    "Fonoaudiologo/a",
    "Profesor/a",
    "Docente",
    "Veterinario/a",
    "Otra",
];

pub const JOB_POSITIONS: &[&str] = &[
    "Administrativo/a",
    "Terapeuta",
    "Conductor",
    "Auxiliar de pista",
    "Herrero",
    "Veterinario",
    "Entrenador de Caballos",
    "Domador",
    "Profesor de Equitacion",
    "Docente de Capacitacion",
    "Auxiliar de mantenimiento",
    "Otra",
];

pub const TEACHER_PROFESSION: &str = "Profesor/a";
pub const THERAPIST_POSITION: &str = "Terapeuta";
pub const CONDUCTOR_POSITION: &str = "Conductor";
pub const TRACK_ASSISTANT_POSITION: &str = "Auxiliar de pista";
pub const HORSE_TRAINER_POSITION: &str = "Entrenador de Caballos";

pub const PROPOSALS: &[&str] = &[
    "Hipoterapia",
    "Monta Terapeutica",
    "Deporte Ecuestre Adaptado",
    "Actividades Recreativas",
    "Equitacion",
];

pub const HEADQUARTERS: &[&str] = &["CASJ", "HLP", "OTRO"];

pub const WEEK_DAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

pub const SCHOLARITY_LEVELS: &[&str] = &["primario", "secundario", "terciario", "universitario"];

pub const HORSE_GENDERS: &[&str] = &["Macho", "Hembra"];
pub const ACQUISITION_TYPES: &[&str] = &["Compra", "Donacion"];

pub const PAYMENT_TYPES: &[&str] = &["Honorarios", "Gastos varios", "Proveedor"];
pub const FEES_PAYMENT_TYPE: &str = "Honorarios";

pub const PUBLICATION_STATES: &[&str] = &["Borrador", "Publicado", "Archivado"];
pub const PUBLISHED_STATE: &str = "Publicado";

pub const CONTACT_STATES: &[&str] = &["pendiente", "en proceso", "terminado"];

pub const RIDER_DOCUMENT_TYPES: &[&str] = &[
    "entrevista",
    "evaluacion",
    "planificaciones",
    "evolucion",
    "cronicas",
    "documental",
];

pub const HORSE_DOCUMENT_TYPES: &[&str] = &[
    "ficha_general",
    "planificacion",
    "informe_de_evaluacion",
    "carga_de_imagenes",
    "registro_veterinario",
];

/// Employee uploads are not categorized; files get this type.
pub const EMPLOYEE_FILE_TYPE: &str = "Archivo";

pub const YES: &str = "yes";
pub const NO: &str = "no";
pub const YES_NO: &[&str] = &[YES, NO];

pub const PAYMENT_METHODS: &[&str] = &["EFECTIVO", "TARJETA_CREDITO", "TARJETA_DEBITO"];
