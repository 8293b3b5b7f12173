//! The analysis prompt sent as the first user turn.
//!
//! Danish throughout: the listings, the buyers, and the statistics data are
//! all Danish, and the report is rendered to Danish-speaking users as-is.

const PROMPT_TEMPLATE: &str = r#"
Du er ekspert i boliganalyser på det danske marked, og bruger idag din erfaring til at hjælpe fremtidige boligejere med at identificere skjulte risici og værdifulde fordele.

Din opgave er at lave en grundig analyse af en boligannonce

Forsøg at vær kreativ med dine fordele og risici, og tænk ud over det åbenlyse - hvad kan være skjulte fordele og risici - og hvad kan være en potentiel dealbreaker for køberen?

Vær opmærksom på, at du skal vurdere boligen ud fra den givne tekst, men du må godt bruge din egen viden og erfaring til at udfylde huller, hvis du ved et område/materiale/boligtype eller noget fjerde er kendt for noget specifikt.

Sørg ALTID for at have en reference til, hvad du har brugt til at komme frem til dit svar, og inkluder det i feltet "excerpt" i JSON-formatet.

Udover at identificere risici og fordele, skal du også afgive en kort rapport om boligen og de kommunale forhold, som kan have indflydelse på boligens værdi.

Det er vigtigt, at du fokuserer på ting, der er vigtige for køberen.

Køberen er et par i 30'erne, med et barn på 3 år. De er begge i arbejde, og har en samlet indkomst på 1.000.000 kr. om året.
Køberen er interesseret i at vide, om boligen er et godt køb, og om der er noget, der kan påvirke boligens værdi.
Køberen er også interesseret i at vide, om boligen er et godt sted at bo.


**OPGAVE 1**

Du skal forsøge at perspektivere boligen i forhold til Danmarks Statistik, og lave en grundig analyse af boligen udfra disse data.

Vælg et par fokusområder, som du vil undersøge nærmere med Danmarks Statistik, som er relevante for din købers profil og boligopslaget.

Du har adgang til Danmarks Statistik via tool_calls:

1. FOR DANMARKS STATISTIK:
- Først, brug get_dst_subjects uden parametre for at få de gyldige top-level subject codes
- Brug derefter get_dst_tables med subject code for at få de gyldige table codes
- Brug derefter get_dst_table_info med table code for at få de gyldige variable
- Brug til sidst get_dst_data med table code og de variable, du vil have data for

Vær OBS på at bruge de rigtige parametre til funktionerne.


**OPGAVE 2**
1. Analyser boligannoncens detaljer, sammen med dine kommunale observationer. Du kan overveje at inkludere disse områder:

**BASAL INFORMATION:**
- Generelle oplysninger: adresse, pris, boligtype, ejerform, størrelse, antal værelser, etage
- Bygningsdetaljer: byggeår, renoveringsår, energimærke, tag, vægge, konstruktionsmateriale
- Økonomi: udbetaling, månedlig ydelse, ejerudgift, boligafgift, grundskyld, fællesudgifter
- Tilstand: generel stand, vedligeholdelsesniveau, energimærke, rapporter (hvis nævnt)
- Området: kvarter, transport, institutioner, indkøbsmuligheder, rekreative områder
- Historik: prisændringer, tid på markedet, tidligere salg
- Energimæssige forhold (fx potentielle høje energiomkostninger)
- Bygningsmæssige forhold (alder, potentielle skjulte fejl, vedligeholdelsesbehov)
- Beliggenhed (støj, trafik, kommende byggeri, parkering)
- Økonomiske forhold (løbende udgifter, boligudgift sammenlignet med markedet)
- Juridiske forhold (forpligtelser, vedtægter, husdyr, udlejning)


**RISICI:**
Identificér mindst 8 risici ved boligen baseret på den givne tekst. Brug din ekspertise til at:
- Vurdere sandsynlige risici baseret på boligtype, alder, beliggenhed og andre tilgængelige oplysninger.
- Komme med realistiske og relevante antagelser, fx om potentielle omkostninger, støjgener eller renoveringsbehov.
- Angive konkrete anbefalinger til spørgsmål, som køberen bør stille eller områder, der bør undersøges yderligere.
- En risiko må ikke involvere energimærkning, hvis energimærkningen mangler.


**FORDELE:**
Identificér mindst 8 fordele, der realistisk kan udledes af teksten. Brug din faglige dømmekraft og understreg styrker, der kan give værdi for køberen.

** Boligannonce: **
{listing_text}


4. Returnér svaret i nedenstående JSON-format:

Hvis energimærkningen mangler, er det på grund af en systemfejl; du skal derfor ikke kommentere på det, og blot svare "Se hos mægler".

**VIGTIGT:** Dit svar SKAL være et JSON-objekt, der følger den specificerede struktur nedenfor. Inkluder IKKE nogen tekst før eller efter JSON-objektet. Start direkte med `{` og slut direkte med `}`.

{
  "summary": "Dine vigtigste konklusioner fra din grundige analyse af kommunen, lokalområdet, og boligopslaget",
  "property": {
    "address": "...",
    "price": "... kr.",
    "udbetaling": "... kr.",
    "pricePerM2": "... kr. per m²",
    "size": "... m²",
    "værelser": "...",
    "floor": "...",
    "boligType": "...",
    "ejerform": "...",
    "energiMaerke": "...",
    "byggeaar": "...",
    "renoveringsaar": "...",
    "maanedligeUdgift": "... kr."
  },
  "risks": [
    {
      "category": "Energi|Tilstand|Økonomi|Beliggenhed|Juridisk|Andet",
      "title": "Kort, præcis titel på risiko",
      "details": "Grundig vurdering af risikoen (2-3 sætninger)",
      "excerpt": "Relevante tekstdetaljer eller din egen vurdering",
      "recommendations": [
        {"promptTitle": "Spørg mægler/Undersøg nærmere", "prompt": "Relevant spørgsmål, der bør stilles mægleren"}
      ]
    }
  ],
  "highlights": [
    {
      "icon": "home|building|map|key|piggy-bank|scale|star|heart|award|lightbulb|thumbs-up|check|flag|search",
      "title": "Kort præcis fordel",
      "details": "Begrundet forklaring af fordelen (2-3 sætninger)"
    }
  ]
}
"#;

/// Renders the analysis prompt with the combined listing text interpolated.
#[must_use]
pub fn analysis_prompt(listing_text: &str) -> String {
    PROMPT_TEMPLATE.replace("{listing_text}", listing_text)
}
